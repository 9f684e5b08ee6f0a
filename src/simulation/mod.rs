pub mod error;
pub mod expr;
pub mod field;
pub mod fraction;
pub mod integrator;
pub mod particle;
pub mod simulator;
pub mod states;
