//! Charged point particle and its recorded trajectory
//!
//! A particle owns its physical constants (mass, charge) and the full
//! time-stamped track produced by a simulation run. The starting point is
//! fixed at construction; the track belongs to the integrator and is exposed
//! read-only.

use crate::simulation::error::SimError;
use crate::simulation::fraction::Frac;
use crate::simulation::states::{mint_id, FVec2, TrackPoint, TrackPointF64};

/// Creation input; every option independently defaulted
#[derive(Default)]
pub struct ParticleOptions {
    /// Defaults to 100
    pub mass: Option<Frac>,
    /// Defaults to 1; any real value including 0 and negatives
    pub charge: Option<Frac>,
    /// Defaults to the origin
    pub position: Option<FVec2>,
    /// Defaults to the unit vector along x
    pub v: Option<FVec2>,
}

/// Axis-aligned box enclosing every recorded position of a track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackBounds {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

pub struct Particle {
    id: String,
    mass: Frac,
    charge: Frac,
    starting_point: TrackPoint,
    // Rewritten wholesale by each simulation run
    pub(crate) track: Vec<TrackPoint>,
}

impl Particle {
    pub fn new(options: ParticleOptions) -> Result<Self, SimError> {
        let mass = options.mass.unwrap_or_else(|| Frac::from_int(100));
        if mass.sign() <= 0 {
            return Err(SimError::NonPositiveMass(mass.to_string()));
        }
        let charge = options.charge.unwrap_or_else(Frac::one);
        let position = options.position.unwrap_or_else(FVec2::zeros);
        let v = options
            .v
            .unwrap_or_else(|| FVec2::new(Frac::one(), Frac::zero()));

        Ok(Self {
            id: mint_id("particle"),
            mass,
            charge,
            starting_point: TrackPoint {
                time: Frac::zero(),
                position,
                v,
            },
            track: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mass(&self) -> &Frac {
        &self.mass
    }

    pub fn charge(&self) -> &Frac {
        &self.charge
    }

    /// State at simulation time 0, fixed at construction
    pub fn starting_point(&self) -> &TrackPoint {
        &self.starting_point
    }

    /// Recorded track, time-ascending; empty until a run completes
    pub fn track(&self) -> &[TrackPoint] {
        &self.track
    }

    /// Interpolated sample at time `t`.
    ///
    /// Locates the last recorded sample at or before `t` (exact hits take
    /// precedence) and extrapolates position with that sample's velocity;
    /// velocity is reported unchanged, consistent with the first-order
    /// integrator's piecewise-constant-velocity view of the track.
    pub fn point_at_time(&self, t: &Frac) -> Result<TrackPoint, SimError> {
        let (first, last) = match (self.track.first(), self.track.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SimError::EmptyTrack),
        };
        if t < &first.time || t > &last.time {
            return Err(SimError::TimeOutOfTrack(t.to_string()));
        }

        // Track is time-ordered: forward scan for the last sample <= t
        let mut before = first;
        for point in &self.track {
            if &point.time == t {
                before = point;
                break;
            } else if &point.time < t {
                before = point;
            } else {
                break;
            }
        }

        let elapsed = t - &before.time;
        Ok(TrackPoint {
            time: t.clone(),
            position: FVec2 {
                x: &before.position.x + &(&before.v.x * &elapsed),
                y: &before.position.y + &(&before.v.y * &elapsed),
            },
            v: before.v.clone(),
        })
    }

    /// [`Self::point_at_time`] as a plain-float snapshot
    pub fn point_at_time_f64(&self, t: &Frac) -> Result<TrackPointF64, SimError> {
        Ok(self.point_at_time(t)?.to_f64())
    }

    /// Axis-aligned bounding box of every recorded position (min/max fold,
    /// exact comparisons, float output)
    pub fn track_bounding_box(&self) -> Result<TrackBounds, SimError> {
        let first = self.track.first().ok_or(SimError::EmptyTrack)?;
        let mut left = &first.position.x;
        let mut right = &first.position.x;
        let mut bottom = &first.position.y;
        let mut top = &first.position.y;

        for point in &self.track {
            if &point.position.x < left {
                left = &point.position.x;
            }
            if &point.position.x > right {
                right = &point.position.x;
            }
            if &point.position.y < bottom {
                bottom = &point.position.y;
            }
            if &point.position.y > top {
                top = &point.position.y;
            }
        }

        Ok(TrackBounds {
            top: top.to_f64(),
            bottom: bottom.to_f64(),
            left: left.to_f64(),
            right: right.to_f64(),
        })
    }
}
