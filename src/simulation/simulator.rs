//! Simulation driver: configuration, run-state machine, and the integration loop
//!
//! The [`Simulator`] exclusively owns one [`Field`] and a collection of
//! [`Particle`]s. A run recomputes every particle's track from scratch,
//! sequentially, one particle fully simulated before the next; there is no
//! cancellation and no cross-particle interaction. Mutation of configuration,
//! areas, and particles is permitted only while idle.

use crate::simulation::error::SimError;
use crate::simulation::field::{CreateFieldAreaOptions, Field, FieldArea};
use crate::simulation::fraction::Frac;
use crate::simulation::integrator::{accurate_step, naive_step};
use crate::simulation::particle::{Particle, ParticleOptions};
use crate::simulation::states::{mint_id, TrackPoint};

/// Recorded simulation window `[from, to]`, `0 <= from <= to`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Frac,
    pub to: Frac,
}

/// idle -> running -> idle; progress is meaningful only while running
#[derive(Clone, Debug, PartialEq)]
enum RunState {
    Idle { simulated: bool },
    Running { progress: f64 },
}

/// Creation input; every option independently defaulted
#[derive(Default)]
pub struct SimulatorOptions {
    /// Defaults to 1/10
    pub delta_time: Option<Frac>,
    /// Defaults to 0
    pub time_range_from: Option<Frac>,
    /// Defaults to 30
    pub time_range_to: Option<Frac>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StartSimulateOptions {
    /// Use the analytic constant-field step instead of the naive one
    pub accurate: bool,
}

pub struct Simulator {
    id: String,
    delta_time: Frac,
    time_range: TimeRange,
    field: Field,
    particles: Vec<Particle>,
    state: RunState,
}

impl Simulator {
    pub fn new(options: SimulatorOptions) -> Result<Self, SimError> {
        let delta_time = options.delta_time.unwrap_or_else(|| Frac::ratio(1, 10));
        let time_range = TimeRange {
            from: options.time_range_from.unwrap_or_else(Frac::zero),
            to: options.time_range_to.unwrap_or_else(|| Frac::from_int(30)),
        };
        Self::ensure_delta_time_legal(&delta_time)?;
        Self::ensure_time_range_legal(&time_range)?;

        Ok(Self {
            id: mint_id("simulator"),
            delta_time,
            time_range,
            field: Field::new(),
            particles: Vec::new(),
            state: RunState::Idle { simulated: false },
        })
    }

    fn ensure_delta_time_legal(delta_time: &Frac) -> Result<(), SimError> {
        if delta_time.sign() <= 0 {
            return Err(SimError::NonPositiveDeltaTime(delta_time.to_string()));
        }
        Ok(())
    }

    fn ensure_time_range_legal(range: &TimeRange) -> Result<(), SimError> {
        if range.from.sign() < 0 {
            return Err(SimError::NegativeTimeRangeFrom(range.from.to_string()));
        }
        if range.to < range.from {
            return Err(SimError::InvertedTimeRange {
                from: range.from.to_string(),
                to: range.to.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<(), SimError> {
        match self.state {
            RunState::Running { .. } => Err(SimError::CurrentlySimulating(operation)),
            RunState::Idle { .. } => Ok(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // ---- configuration ----

    /// Candidates are validated before anything is assigned; on error the
    /// prior configuration is unchanged.
    pub fn set_delta_time(&mut self, delta_time: Frac) -> Result<(), SimError> {
        self.ensure_idle("setting delta time")?;
        Self::ensure_delta_time_legal(&delta_time)?;
        self.delta_time = delta_time;
        Ok(())
    }

    pub fn delta_time(&self) -> f64 {
        self.delta_time.to_f64()
    }

    pub fn set_simulation_time_range(
        &mut self,
        from: Option<Frac>,
        to: Option<Frac>,
    ) -> Result<(), SimError> {
        self.ensure_idle("setting time range")?;
        let candidate = TimeRange {
            from: from.unwrap_or_else(|| self.time_range.from.clone()),
            to: to.unwrap_or_else(|| self.time_range.to.clone()),
        };
        Self::ensure_time_range_legal(&candidate)?;
        self.time_range = candidate;
        Ok(())
    }

    pub fn simulation_time_range(&self) -> (f64, f64) {
        (self.time_range.from.to_f64(), self.time_range.to.to_f64())
    }

    // ---- field areas and particles ----

    pub fn create_field_area(
        &mut self,
        options: CreateFieldAreaOptions,
    ) -> Result<String, SimError> {
        self.ensure_idle("creating a field area")?;
        self.field.create_field_area(options)
    }

    pub fn delete_field_area(&mut self, id: &str) -> Result<bool, SimError> {
        self.ensure_idle("deleting a field area")?;
        Ok(self.field.delete_field_area(id))
    }

    pub fn create_particle(&mut self, options: ParticleOptions) -> Result<String, SimError> {
        self.ensure_idle("creating a particle")?;
        let particle = Particle::new(options)?;
        let id = particle.id().to_string();
        self.particles.push(particle);
        Ok(id)
    }

    pub fn delete_particle(&mut self, id: &str) -> Result<bool, SimError> {
        self.ensure_idle("deleting a particle")?;
        let before = self.particles.len();
        self.particles.retain(|p| p.id() != id);
        Ok(self.particles.len() != before)
    }

    // ---- read-only query surface ----

    pub fn get_is_simulated(&self) -> bool {
        matches!(self.state, RunState::Idle { simulated: true })
    }

    pub fn get_is_simulating(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// Monotonic progress fraction while running, NaN otherwise
    pub fn get_simulate_progress(&self) -> f64 {
        match self.state {
            RunState::Running { progress } => progress,
            RunState::Idle { .. } => f64::NAN,
        }
    }

    pub fn get_field_areas(&self) -> &[FieldArea] {
        self.field.areas()
    }

    pub fn get_particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get_particle(&self, id: &str) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id() == id)
    }

    // ---- the run ----

    /// Run the simulation to completion, replacing every particle's track.
    ///
    /// With `n_before = floor(from/dt)` and `n_after = ceil(to/dt)`, steps
    /// `1..=n_before` only warm up the current point; steps
    /// `n_before+1..=n_after` are recorded. A zero-span window records the
    /// warmed-up current point as the single sample. Progress advances to
    /// `step/n_after` after every step.
    pub fn start_simulate(&mut self, options: StartSimulateOptions) -> Result<(), SimError> {
        self.ensure_idle("starting another run")?;

        let n_before = (&self.time_range.from / &self.delta_time)
            .floor_i64()
            .ok_or(SimError::StepCountOverflow)?;
        let n_after = (&self.time_range.to / &self.delta_time)
            .ceil_i64()
            .ok_or(SimError::StepCountOverflow)?;

        self.state = RunState::Running { progress: 0.0 };

        let step_fn: fn(&Field, &Particle, &Frac, &TrackPoint) -> TrackPoint = if options.accurate
        {
            accurate_step
        } else {
            naive_step
        };
        let delta_time = self.delta_time.clone();

        for i in 0..self.particles.len() {
            let mut current = self.particles[i].starting_point().clone();
            self.particles[i].track.clear();

            // Warm-up: advance to the start of the recorded window without recording
            for step in 1..=n_before {
                current = step_fn(&self.field, &self.particles[i], &delta_time, &current);
                self.state = RunState::Running {
                    progress: step as f64 / n_after as f64,
                };
            }

            if n_after == n_before {
                // Zero-span window: the current point is the single sample
                self.particles[i].track.push(current.clone());
            }

            for step in (n_before + 1)..=n_after {
                let last = match self.particles[i].track.last() {
                    Some(point) => point.clone(),
                    None => current.clone(),
                };
                let next = step_fn(&self.field, &self.particles[i], &delta_time, &last);
                self.particles[i].track.push(next);
                self.state = RunState::Running {
                    progress: step as f64 / n_after as f64,
                };
            }
        }

        self.state = RunState::Idle { simulated: true };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let sim = Simulator::new(SimulatorOptions::default()).unwrap();
        assert_eq!(sim.delta_time(), 0.1);
        assert_eq!(sim.simulation_time_range(), (0.0, 30.0));
        assert!(!sim.get_is_simulated());
        assert!(!sim.get_is_simulating());
        assert!(sim.get_simulate_progress().is_nan());
    }

    #[test]
    fn illegal_configuration_rejected_without_state_change() {
        let mut sim = Simulator::new(SimulatorOptions::default()).unwrap();

        assert!(matches!(
            sim.set_delta_time(Frac::zero()),
            Err(SimError::NonPositiveDeltaTime(_))
        ));
        assert!(matches!(
            sim.set_delta_time(Frac::from_int(-1)),
            Err(SimError::NonPositiveDeltaTime(_))
        ));
        assert_eq!(sim.delta_time(), 0.1);

        assert!(matches!(
            sim.set_simulation_time_range(Some(Frac::from_int(-1)), None),
            Err(SimError::NegativeTimeRangeFrom(_))
        ));
        assert!(matches!(
            sim.set_simulation_time_range(Some(Frac::from_int(10)), Some(Frac::from_int(5))),
            Err(SimError::InvertedTimeRange { .. })
        ));
        assert_eq!(sim.simulation_time_range(), (0.0, 30.0));

        assert!(Simulator::new(SimulatorOptions {
            delta_time: Some(Frac::zero()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn partial_time_range_update_keeps_other_bound() {
        let mut sim = Simulator::new(SimulatorOptions::default()).unwrap();
        sim.set_simulation_time_range(None, Some(Frac::from_int(50)))
            .unwrap();
        assert_eq!(sim.simulation_time_range(), (0.0, 50.0));
        sim.set_simulation_time_range(Some(Frac::from_int(5)), None)
            .unwrap();
        assert_eq!(sim.simulation_time_range(), (5.0, 50.0));
    }

    #[test]
    fn delete_particle_reports_presence() {
        let mut sim = Simulator::new(SimulatorOptions::default()).unwrap();
        let id = sim.create_particle(ParticleOptions::default()).unwrap();
        assert_eq!(sim.get_particles().len(), 1);
        assert!(!sim.delete_particle("particle-missing").unwrap());
        assert_eq!(sim.get_particles().len(), 1);
        assert!(sim.delete_particle(&id).unwrap());
        assert!(sim.get_particles().is_empty());
    }
}
