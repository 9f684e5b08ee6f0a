//! Configuration types for loading simulation scenarios from JSON
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario and the mapping into a runtime [`Simulator`]. A
//! scenario consists of:
//!
//! - `deltaTime`  – fixed integration step size
//! - `timeRange`  – recorded simulation window `{from, to}`
//! - `fields`     – field areas: a border (expression string or `false` for
//!   all of space) plus constant `E` and `B` values
//! - `particles`  – initial particle states
//!
//! # JSON format
//!
//! ```json
//! {
//!   "deltaTime": 0.01,
//!   "timeRange": { "from": 0, "to": 100 },
//!   "fields": [
//!     { "border": "x > 0 and x < 150", "E": { "x": 0, "y": 0 }, "B": { "z": -1 } }
//!   ],
//!   "particles": [
//!     { "charge": -1, "mass": 10, "position": { "x": -110, "y": -100 }, "v": { "x": 10, "y": 0 } }
//!   ]
//! }
//! ```
//!
//! Every numeric value may also be written as a numeric string
//! (`"deltaTime": "1/100"`), which is parsed to an exact rational.

use serde::Deserialize;

use crate::simulation::error::SimError;
use crate::simulation::field::{BFieldSpec, BorderOptions, CreateFieldAreaOptions, EFieldSpec};
use crate::simulation::fraction::Frac;
use crate::simulation::particle::ParticleOptions;
use crate::simulation::simulator::{Simulator, SimulatorOptions};
use crate::simulation::states::FVec2;

/// Border of a field area: an expression string, or `false` for all of space
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum BorderConfig {
    Expression(String),
    WholeSpace(bool), // only `false` is legal here
}

/// In-plane point or vector `{x, y}`
#[derive(Deserialize, Debug, Clone)]
pub struct PointConfig {
    pub x: Frac,
    pub y: Frac,
}

/// Constant electric field `{x, y}`
#[derive(Deserialize, Debug, Clone)]
pub struct EConfig {
    pub x: Frac,
    pub y: Frac,
}

/// Constant out-of-plane magnetic field `{z}`
#[derive(Deserialize, Debug, Clone)]
pub struct BConfig {
    pub z: Frac,
}

/// One field area of the scenario
#[derive(Deserialize, Debug, Clone)]
pub struct FieldAreaConfig {
    pub border: BorderConfig,
    #[serde(rename = "E")]
    pub e: EConfig,
    #[serde(rename = "B")]
    pub b: BConfig,
}

/// Initial state of one particle; omitted options fall back to the
/// particle defaults (mass 100, charge 1, origin, unit velocity along x)
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub charge: Option<Frac>,
    pub mass: Option<Frac>,
    pub position: Option<PointConfig>,
    pub v: Option<PointConfig>,
}

/// Recorded simulation window
#[derive(Deserialize, Debug, Clone)]
pub struct TimeRangeConfig {
    pub from: Frac,
    pub to: Frac,
}

/// Top-level scenario configuration loaded from JSON
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(rename = "deltaTime")]
    pub delta_time: Frac,
    #[serde(rename = "timeRange")]
    pub time_range: TimeRangeConfig,
    pub fields: Vec<FieldAreaConfig>,
    pub particles: Vec<ParticleConfig>,
}

/// Map a scenario configuration into a ready-to-run [`Simulator`]:
/// configuration is validated, every field area is created (expression
/// borders parsed here), and every particle is added.
pub fn build_simulator(cfg: ScenarioConfig) -> Result<Simulator, SimError> {
    let mut simulator = Simulator::new(SimulatorOptions {
        delta_time: Some(cfg.delta_time),
        time_range_from: Some(cfg.time_range.from),
        time_range_to: Some(cfg.time_range.to),
    })?;

    for area in cfg.fields {
        let border = match area.border {
            BorderConfig::Expression(src) => BorderOptions::Expression(src),
            BorderConfig::WholeSpace(false) => BorderOptions::Everywhere,
            BorderConfig::WholeSpace(true) => return Err(SimError::InvalidBorderOption),
        };
        simulator.create_field_area(CreateFieldAreaOptions {
            border,
            e: EFieldSpec::Constant(FVec2::new(area.e.x, area.e.y)),
            b: BFieldSpec::Constant(area.b.z),
        })?;
    }

    for particle in cfg.particles {
        simulator.create_particle(ParticleOptions {
            mass: particle.mass,
            charge: particle.charge,
            position: particle.position.map(|p| FVec2::new(p.x, p.y)),
            v: particle.v.map(|p| FVec2::new(p.x, p.y)),
        })?;
    }

    Ok(simulator)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "deltaTime": "1/100",
        "timeRange": { "from": 0, "to": 2 },
        "fields": [
            { "border": "x > 0 and x < 150", "E": { "x": 0, "y": 0 }, "B": { "z": -1 } },
            { "border": false, "E": { "x": "0.5", "y": 0 }, "B": { "z": 0 } }
        ],
        "particles": [
            { "charge": -1, "mass": 10, "position": { "x": -110, "y": -100 }, "v": { "x": 10, "y": 0 } },
            { "charge": null, "mass": null, "position": null, "v": null }
        ]
    }"#;

    #[test]
    fn scenario_round_trip() {
        let cfg: ScenarioConfig = serde_json::from_str(SCENARIO).unwrap();
        assert_eq!(cfg.delta_time, Frac::ratio(1, 100));
        assert_eq!(cfg.fields.len(), 2);

        let sim = build_simulator(cfg).unwrap();
        assert_eq!(sim.get_field_areas().len(), 2);
        assert_eq!(sim.get_particles().len(), 2);
        assert_eq!(sim.delta_time(), 0.01);

        // defaults applied to the all-null particle
        let p = &sim.get_particles()[1];
        assert_eq!(p.mass(), &Frac::from_int(100));
        assert_eq!(p.charge(), &Frac::one());
    }

    #[test]
    fn true_border_is_rejected() {
        let cfg: ScenarioConfig = serde_json::from_str(
            r#"{
                "deltaTime": 0.1,
                "timeRange": { "from": 0, "to": 1 },
                "fields": [ { "border": true, "E": { "x": 0, "y": 0 }, "B": { "z": 0 } } ],
                "particles": []
            }"#,
        )
        .unwrap();
        assert!(matches!(
            build_simulator(cfg),
            Err(SimError::InvalidBorderOption)
        ));
    }

    #[test]
    fn bad_expression_border_fails_at_build() {
        let cfg: ScenarioConfig = serde_json::from_str(
            r#"{
                "deltaTime": 0.1,
                "timeRange": { "from": 0, "to": 1 },
                "fields": [ { "border": "x >", "E": { "x": 0, "y": 0 }, "B": { "z": 0 } } ],
                "particles": []
            }"#,
        )
        .unwrap();
        assert!(matches!(
            build_simulator(cfg),
            Err(SimError::BadBorderExpression(_))
        ));
    }
}
