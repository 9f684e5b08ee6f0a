//! Field model: piecewise-superposed electric and magnetic field areas
//!
//! A [`Field`] holds an unordered collection of [`FieldArea`]s. Each area
//! pairs a spatial border predicate with an E-field and a B-field evaluator;
//! the joint field at a point is the sum of the contributions of every area
//! whose border holds there. The model is planar: E lies in the plane, B is
//! confined to the out-of-plane z axis.

use crate::simulation::error::SimError;
use crate::simulation::expr::BorderExpr;
use crate::simulation::fraction::Frac;
use crate::simulation::states::{mint_id, FVec2};

/// Spatial predicate deciding whether an area covers a point.
///
/// Position only, never time: an area's extent is fixed.
pub enum Border {
    /// Covers all of space
    Everywhere,
    /// Boolean expression over (x, y), evaluated exactly
    Expression(BorderExpr),
    /// Arbitrary closed-form predicate of position
    Predicate(Box<dyn Fn(&Frac, &Frac) -> bool + Send + Sync>),
}

impl Border {
    /// Whether the area covers (x, y). A singular expression evaluation
    /// (e.g. division by zero at this point) counts as not covering.
    pub fn judge(&self, x: &Frac, y: &Frac) -> bool {
        match self {
            Border::Everywhere => true,
            Border::Expression(expr) => expr.truthy_at(x, y).unwrap_or(false),
            Border::Predicate(f) => f(x, y),
        }
    }
}

/// Electric field of one area: a constant in-plane vector, or a function of
/// position and time
pub enum EFieldSpec {
    Constant(FVec2),
    Function(Box<dyn Fn(f64, f64, f64) -> FVec2 + Send + Sync>),
}

impl EFieldSpec {
    pub fn value_at(&self, x: &Frac, y: &Frac, t: &Frac) -> FVec2 {
        match self {
            EFieldSpec::Constant(v) => v.clone(),
            EFieldSpec::Function(f) => f(x.to_f64(), y.to_f64(), t.to_f64()),
        }
    }
}

/// Magnetic field of one area: a constant out-of-plane scalar, or a function
/// of position and time
pub enum BFieldSpec {
    Constant(Frac),
    Function(Box<dyn Fn(f64, f64, f64) -> Frac + Send + Sync>),
}

impl BFieldSpec {
    pub fn value_at(&self, x: &Frac, y: &Frac, t: &Frac) -> Frac {
        match self {
            BFieldSpec::Constant(z) => z.clone(),
            BFieldSpec::Function(f) => f(x.to_f64(), y.to_f64(), t.to_f64()),
        }
    }
}

/// Border option accepted at area creation
pub enum BorderOptions {
    /// No border; the area covers all of space
    Everywhere,
    /// Expression source text, parsed (and validated) at creation
    Expression(String),
    Predicate(Box<dyn Fn(&Frac, &Frac) -> bool + Send + Sync>),
}

/// Creation input for one field area
pub struct CreateFieldAreaOptions {
    pub border: BorderOptions,
    pub e: EFieldSpec,
    pub b: BFieldSpec,
}

/// One immutable field area. Created through [`Field::create_field_area`],
/// never modified afterwards except by deletion.
pub struct FieldArea {
    id: String,
    border: Border,
    e: EFieldSpec,
    b: BFieldSpec,
}

impl FieldArea {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn border(&self) -> &Border {
        &self.border
    }

    pub fn e(&self) -> &EFieldSpec {
        &self.e
    }

    pub fn b(&self) -> &BFieldSpec {
        &self.b
    }
}

/// Superposed field sample at one point and time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JointField {
    pub e: FVec2,
    pub b_z: Frac,
}

/// Ordered-by-creation (but order-irrelevant) collection of field areas
#[derive(Default)]
pub struct Field {
    areas: Vec<FieldArea>,
}

impl Field {
    pub fn new() -> Self {
        Self { areas: Vec::new() }
    }

    /// Validate the options, mint a fresh id, and append the area.
    /// Expression borders that fail to parse are rejected here; nothing is
    /// added in that case.
    pub fn create_field_area(&mut self, options: CreateFieldAreaOptions) -> Result<String, SimError> {
        let border = match options.border {
            BorderOptions::Everywhere => Border::Everywhere,
            BorderOptions::Expression(src) => Border::Expression(BorderExpr::parse(&src)?),
            BorderOptions::Predicate(f) => Border::Predicate(f),
        };
        let area = FieldArea {
            id: mint_id("area"),
            border,
            e: options.e,
            b: options.b,
        };
        let id = area.id.clone();
        self.areas.push(area);
        Ok(id)
    }

    /// Remove the area with this id. Unknown ids are a normal, reportable
    /// outcome, not an error.
    pub fn delete_field_area(&mut self, id: &str) -> bool {
        let before = self.areas.len();
        self.areas.retain(|area| area.id != id);
        self.areas.len() != before
    }

    pub fn areas(&self) -> &[FieldArea] {
        &self.areas
    }

    /// Joint field at (x, y) and time t: sum the E and B contributions of
    /// every area whose border holds at (x, y). No covering area means a
    /// zero field; there is no error path.
    pub fn field_at(&self, x: &Frac, y: &Frac, t: &Frac) -> JointField {
        let mut joint = JointField {
            e: FVec2::zeros(),
            b_z: Frac::zero(),
        };
        for area in &self.areas {
            if area.border.judge(x, y) {
                let e = area.e.value_at(x, y, t);
                joint.e = &joint.e + &e;
                joint.b_z = &joint.b_z + &area.b.value_at(x, y, t);
            }
        }
        joint
    }
}
