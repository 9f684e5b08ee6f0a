//! Core state types for the particle simulation
//!
//! Defines the exact 2D vector (`FVec2`), the timestamped trajectory sample
//! (`TrackPoint`), and their float-facing snapshots (`NVec2`,
//! `TrackPointF64`) handed to rendering/UI consumers.

use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Vector2;

use crate::simulation::fraction::Frac;

pub type NVec2 = Vector2<f64>;

/// 2D vector with exact rational components
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FVec2 {
    pub x: Frac,
    pub y: Frac,
}

impl FVec2 {
    pub fn new(x: Frac, y: Frac) -> Self {
        Self { x, y }
    }

    pub fn zeros() -> Self {
        Self {
            x: Frac::zero(),
            y: Frac::zero(),
        }
    }

    /// Componentwise scaling by an exact factor
    pub fn scale(&self, k: &Frac) -> Self {
        Self {
            x: &self.x * k,
            y: &self.y * k,
        }
    }

    /// Euclidean norm; exact squares, float square root
    pub fn norm(&self) -> Frac {
        (self.x.square() + self.y.square()).sqrt()
    }

    pub fn to_f64(&self) -> NVec2 {
        NVec2::new(self.x.to_f64(), self.y.to_f64())
    }
}

impl<'a, 'b> Add<&'b FVec2> for &'a FVec2 {
    type Output = FVec2;
    fn add(self, rhs: &'b FVec2) -> FVec2 {
        FVec2 {
            x: &self.x + &rhs.x,
            y: &self.y + &rhs.y,
        }
    }
}

impl<'a, 'b> Sub<&'b FVec2> for &'a FVec2 {
    type Output = FVec2;
    fn sub(self, rhs: &'b FVec2) -> FVec2 {
        FVec2 {
            x: &self.x - &rhs.x,
            y: &self.y - &rhs.y,
        }
    }
}

/// One timestamped sample of a particle's motion, all components exact
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackPoint {
    pub time: Frac,
    pub position: FVec2,
    pub v: FVec2,
}

impl TrackPoint {
    pub fn to_f64(&self) -> TrackPointF64 {
        TrackPointF64 {
            time: self.time.to_f64(),
            position: self.position.to_f64(),
            v: self.v.to_f64(),
        }
    }
}

/// Float snapshot of a [`TrackPoint`] for consumers that do not need exactness
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPointF64 {
    pub time: f64,
    pub position: NVec2,
    pub v: NVec2,
}

/// Mint an opaque unique id with the given entity prefix
pub(crate) fn mint_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:08x}", prefix, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = mint_id("area");
        let b = mint_id("area");
        assert_ne!(a, b);
        assert!(a.starts_with("area-"));
    }

    #[test]
    fn vector_arithmetic_is_exact() {
        let a = FVec2::new(Frac::ratio(1, 3), Frac::ratio(1, 6));
        let b = FVec2::new(Frac::ratio(2, 3), Frac::ratio(5, 6));
        assert_eq!(&a + &b, FVec2::new(Frac::one(), Frac::one()));
        assert_eq!(
            a.scale(&Frac::from_int(3)),
            FVec2::new(Frac::one(), Frac::ratio(1, 2))
        );
    }
}
