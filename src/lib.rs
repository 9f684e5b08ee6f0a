pub mod configuration;
pub mod simulation;

pub use simulation::error::SimError;
pub use simulation::expr::{BorderExpr, ExprError};
pub use simulation::field::{
    BFieldSpec, Border, BorderOptions, CreateFieldAreaOptions, EFieldSpec, Field, FieldArea,
    JointField,
};
pub use simulation::fraction::Frac;
pub use simulation::integrator::{accurate_step, naive_step};
pub use simulation::particle::{Particle, ParticleOptions, TrackBounds};
pub use simulation::simulator::{Simulator, SimulatorOptions, StartSimulateOptions, TimeRange};
pub use simulation::states::{FVec2, NVec2, TrackPoint, TrackPointF64};

pub use configuration::config::{
    build_simulator, BConfig, BorderConfig, EConfig, FieldAreaConfig, ParticleConfig,
    PointConfig, ScenarioConfig, TimeRangeConfig,
};
