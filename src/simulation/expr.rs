//! Border expression language
//!
//! Field-area borders may be given as a boolean expression over the two
//! position variables `x` and `y`, e.g. `x > 0 and x < 150` or
//! `x*x + y*y <= 100`. The grammar, lowest precedence first:
//!
//! ```text
//! or    := and ("or" and)*
//! and   := unary ("and" unary)*
//! unary := "not" unary | cmp
//! cmp   := sum (("<" | "<=" | ">" | ">=" | "==" | "=" | "!=") sum)?
//! sum   := term (("+" | "-") term)*
//! term  := factor (("*" | "/") factor)*
//! factor:= "-" factor | power
//! power := atom ("^" integer-exponent)?
//! atom  := number | "x" | "y" | "(" or ")"
//! ```
//!
//! Literals parse to exact rationals and evaluation is exact throughout, so
//! border membership never flips from floating-point noise. A bare numeric
//! result is truthy when nonzero.

use std::str::FromStr;

use thiserror::Error;

use crate::simulation::fraction::Frac;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("unexpected character `{0}` in expression")]
    UnexpectedChar(char),

    #[error("unknown identifier `{0}` in expression (only `x`, `y`, `and`, `or`, `not`)")]
    UnknownIdent(String),

    #[error("invalid numeric literal `{0}` in expression")]
    BadNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at `{0}`")]
    UnexpectedToken(String),

    #[error("division by zero while evaluating expression")]
    DivisionByZero,

    #[error("exponent must be an integer literal")]
    BadExponent,

    #[error("boolean value used as a number in expression")]
    BoolInArithmetic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Num(Frac),
    X,
    Y,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone)]
enum Node {
    Num(Frac),
    X,
    Y,
    Neg(Box<Node>),
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Div(Box<Node>, Box<Node>),
    Pow(Box<Node>, i32),
    Cmp(CmpOp, Box<Node>, Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

/// Result of evaluating a (sub)expression
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Num(Frac),
    Bool(bool),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => !n.is_zero(),
        }
    }

    fn num(self) -> Result<Frac, ExprError> {
        match self {
            Value::Num(n) => Ok(n),
            Value::Bool(_) => Err(ExprError::BoolInArithmetic),
        }
    }
}

fn lex(src: &str) -> Result<Vec<Tok>, ExprError> {
    let mut toks = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                toks.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                toks.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                toks.push(Tok::Star);
                i += 1;
            }
            '/' => {
                toks.push(Tok::Slash);
                i += 1;
            }
            '^' => {
                toks.push(Tok::Caret);
                i += 1;
            }
            '(' => {
                toks.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                toks.push(Tok::RParen);
                i += 1;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::Le);
                    i += 2;
                } else {
                    toks.push(Tok::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::Ge);
                    i += 2;
                } else {
                    toks.push(Tok::Gt);
                    i += 1;
                }
            }
            '=' => {
                // both `=` and `==` compare
                if chars.get(i + 1) == Some(&'=') {
                    i += 2;
                } else {
                    i += 1;
                }
                toks.push(Tok::Eq);
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    toks.push(Tok::Ne);
                    i += 2;
                } else {
                    return Err(ExprError::UnexpectedChar('!'));
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value =
                    Frac::from_str(&text).map_err(|_| ExprError::BadNumber(text.clone()))?;
                toks.push(Tok::Num(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                toks.push(match word.as_str() {
                    "x" => Tok::X,
                    "y" => Tok::Y,
                    "and" => Tok::And,
                    "or" => Tok::Or,
                    "not" => Tok::Not,
                    _ => return Err(ExprError::UnknownIdent(word)),
                });
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }
    Ok(toks)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Result<Tok, ExprError> {
        let tok = self.toks.get(self.pos).cloned().ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_and()?;
        while self.eat(&Tok::Or) {
            let rhs = self.parse_and()?;
            node = Node::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_unary()?;
        while self.eat(&Tok::And) {
            let rhs = self.parse_unary()?;
            node = Node::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Node, ExprError> {
        if self.eat(&Tok::Not) {
            return Ok(Node::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Node, ExprError> {
        let lhs = self.parse_sum()?;
        let op = match self.peek() {
            Some(Tok::Lt) => CmpOp::Lt,
            Some(Tok::Le) => CmpOp::Le,
            Some(Tok::Gt) => CmpOp::Gt,
            Some(Tok::Ge) => CmpOp::Ge,
            Some(Tok::Eq) => CmpOp::Eq,
            Some(Tok::Ne) => CmpOp::Ne,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_sum()?;
        Ok(Node::Cmp(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_sum(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_term()?;
        loop {
            if self.eat(&Tok::Plus) {
                let rhs = self.parse_term()?;
                node = Node::Add(Box::new(node), Box::new(rhs));
            } else if self.eat(&Tok::Minus) {
                let rhs = self.parse_term()?;
                node = Node::Sub(Box::new(node), Box::new(rhs));
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_term(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_factor()?;
        loop {
            if self.eat(&Tok::Star) {
                let rhs = self.parse_factor()?;
                node = Node::Mul(Box::new(node), Box::new(rhs));
            } else if self.eat(&Tok::Slash) {
                let rhs = self.parse_factor()?;
                node = Node::Div(Box::new(node), Box::new(rhs));
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_factor(&mut self) -> Result<Node, ExprError> {
        if self.eat(&Tok::Minus) {
            return Ok(Node::Neg(Box::new(self.parse_factor()?)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Node, ExprError> {
        let base = self.parse_atom()?;
        if !self.eat(&Tok::Caret) {
            return Ok(base);
        }
        // exponent must be a (possibly negated) integer literal
        let negative = self.eat(&Tok::Minus);
        let exp = match self.next()? {
            Tok::Num(n) => {
                let whole = n.floor_i64().ok_or(ExprError::BadExponent)?;
                if Frac::from_int(whole) != n || i32::try_from(whole).is_err() {
                    return Err(ExprError::BadExponent);
                }
                whole as i32
            }
            _ => return Err(ExprError::BadExponent),
        };
        Ok(Node::Pow(Box::new(base), if negative { -exp } else { exp }))
    }

    fn parse_atom(&mut self) -> Result<Node, ExprError> {
        match self.next()? {
            Tok::Num(n) => Ok(Node::Num(n)),
            Tok::X => Ok(Node::X),
            Tok::Y => Ok(Node::Y),
            Tok::LParen => {
                let inner = self.parse_or()?;
                if self.eat(&Tok::RParen) {
                    Ok(inner)
                } else {
                    Err(ExprError::UnexpectedEnd)
                }
            }
            other => Err(ExprError::UnexpectedToken(format!("{:?}", other))),
        }
    }
}

fn eval(node: &Node, x: &Frac, y: &Frac) -> Result<Value, ExprError> {
    let arith = |n: &Node| -> Result<Frac, ExprError> { eval(n, x, y)?.num() };
    Ok(match node {
        Node::Num(n) => Value::Num(n.clone()),
        Node::X => Value::Num(x.clone()),
        Node::Y => Value::Num(y.clone()),
        Node::Neg(a) => Value::Num(-arith(a)?),
        Node::Add(a, b) => Value::Num(arith(a)? + arith(b)?),
        Node::Sub(a, b) => Value::Num(arith(a)? - arith(b)?),
        Node::Mul(a, b) => Value::Num(arith(a)? * arith(b)?),
        Node::Div(a, b) => {
            let den = arith(b)?;
            if den.is_zero() {
                return Err(ExprError::DivisionByZero);
            }
            Value::Num(arith(a)? / den)
        }
        Node::Pow(a, exp) => {
            let base = arith(a)?;
            if *exp < 0 && base.is_zero() {
                return Err(ExprError::DivisionByZero);
            }
            Value::Num(base.powi(*exp))
        }
        Node::Cmp(op, a, b) => {
            let (a, b) = (arith(a)?, arith(b)?);
            Value::Bool(match op {
                CmpOp::Lt => a < b,
                CmpOp::Le => a <= b,
                CmpOp::Gt => a > b,
                CmpOp::Ge => a >= b,
                CmpOp::Eq => a == b,
                CmpOp::Ne => a != b,
            })
        }
        Node::And(a, b) => Value::Bool(eval(a, x, y)?.truthy() && eval(b, x, y)?.truthy()),
        Node::Or(a, b) => Value::Bool(eval(a, x, y)?.truthy() || eval(b, x, y)?.truthy()),
        Node::Not(a) => Value::Bool(!eval(a, x, y)?.truthy()),
    })
}

/// A parsed border expression over position variables `x` and `y`
#[derive(Debug, Clone)]
pub struct BorderExpr {
    source: String,
    root: Node,
}

impl BorderExpr {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let toks = lex(source)?;
        let mut parser = Parser { toks, pos: 0 };
        let root = parser.parse_or()?;
        if let Some(extra) = parser.peek() {
            return Err(ExprError::UnexpectedToken(format!("{:?}", extra)));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Truthiness of the expression at (x, y). Evaluation errors (e.g. a
    /// division that becomes singular at this point) are reported as `Err`.
    pub fn truthy_at(&self, x: &Frac, y: &Frac) -> Result<bool, ExprError> {
        Ok(eval(&self.root, x, y)?.truthy())
    }
}
