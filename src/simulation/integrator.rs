//! Fixed-step trajectory steppers for a charged particle in the joint field
//!
//! Two interchangeable pure step functions with the same signature:
//!
//! - [`naive_step`]: first-order explicit update from the instantaneous
//!   Lorentz force. Position advances with the *pre-update* velocity and
//!   velocity with the current acceleration; this ordering defines the
//!   scheme's numerical character and is preserved exactly.
//! - [`accurate_step`]: closed-form update assuming the local field sample is
//!   constant over the step — an exact parabola when B is zero, otherwise
//!   circular motion about the gyrocenter plus the E×B drift.
//!
//! All state stays in exact rational form; only the rotation angle's sine and
//! cosine pass through f64.

use crate::simulation::field::{Field, JointField};
use crate::simulation::fraction::Frac;
use crate::simulation::particle::Particle;
use crate::simulation::states::{FVec2, TrackPoint};

/// Planar Lorentz acceleration `a = (qE + q v × B) / m` with B on the z axis,
/// so the magnetic term is `F_x = q v_y B_z`, `F_y = -q v_x B_z`.
fn lorentz_acceleration(joint: &JointField, charge: &Frac, mass: &Frac, v: &FVec2) -> FVec2 {
    let f_e = FVec2 {
        x: charge * &joint.e.x,
        y: charge * &joint.e.y,
    };
    let f_b = FVec2 {
        x: &(charge * &v.y) * &joint.b_z,
        y: -&(&(charge * &v.x) * &joint.b_z),
    };
    FVec2 {
        x: &(&f_e.x + &f_b.x) / mass,
        y: &(&f_e.y + &f_b.y) / mass,
    }
}

/// Advance one step with the explicit first-order update.
///
/// Velocity gains `a*dt`; position gains the *old* velocity times `dt`.
pub fn naive_step(
    field: &Field,
    particle: &Particle,
    delta_time: &Frac,
    last: &TrackPoint,
) -> TrackPoint {
    let joint = field.field_at(&last.position.x, &last.position.y, &last.time);
    let a = lorentz_acceleration(&joint, particle.charge(), particle.mass(), &last.v);

    TrackPoint {
        time: &last.time + delta_time,
        // x_n+1 = x_n + v_n * dt (pre-update velocity)
        position: FVec2 {
            x: &last.position.x + &(&last.v.x * delta_time),
            y: &last.position.y + &(&last.v.y * delta_time),
        },
        // v_n+1 = v_n + a_n * dt
        v: FVec2 {
            x: &last.v.x + &(&a.x * delta_time),
            y: &last.v.y + &(&a.y * delta_time),
        },
    }
}

/// Advance one step with the analytic constant-field solution.
///
/// `B_z == 0` (and the force-free `q == 0` case) takes the exact parabolic
/// update; otherwise the velocity splits into the E×B drift plus a circular
/// component rotated about the gyrocenter. A zero circular radius means the
/// velocity already equals the drift velocity (uniform linear motion) and
/// falls back to the naive step.
pub fn accurate_step(
    field: &Field,
    particle: &Particle,
    delta_time: &Frac,
    last: &TrackPoint,
) -> TrackPoint {
    let joint = field.field_at(&last.position.x, &last.position.y, &last.time);
    let charge = particle.charge();
    let mass = particle.mass();

    if joint.b_z.is_zero() || charge.is_zero() {
        // Constant force: exact kinematics
        //   dx = (v + a*dt/2) * dt,  dv = a * dt
        let a = lorentz_acceleration(&joint, charge, mass, &last.v);
        let half = Frac::ratio(1, 2);
        let half_a_dt = FVec2 {
            x: &(&half * &a.x) * delta_time,
            y: &(&half * &a.y) * delta_time,
        };
        return TrackPoint {
            time: &last.time + delta_time,
            position: FVec2 {
                x: &last.position.x + &(&(&last.v.x + &half_a_dt.x) * delta_time),
                y: &last.position.y + &(&(&last.v.y + &half_a_dt.y) * delta_time),
            },
            v: FVec2 {
                x: &last.v.x + &(&a.x * delta_time),
                y: &last.v.y + &(&a.y * delta_time),
            },
        };
    }

    // E×B drift velocity: (E_y / B_z, -E_x / B_z)
    let v_drift = FVec2 {
        x: &joint.e.y / &joint.b_z,
        y: -&(&joint.e.x / &joint.b_z),
    };
    // Circular component of the velocity
    let v_circ = &last.v - &v_drift;
    let v_circ_abs = v_circ.norm();

    // Radius vector from the particle to the gyrocenter:
    //   R = (m*Vc_y / (B_z*q), -m*Vc_x / (B_z*q))
    let b_q = &joint.b_z * charge;
    let r = FVec2 {
        x: &(mass * &v_circ.y) / &b_q,
        y: -&(&(mass * &v_circ.x) / &b_q),
    };
    let r_abs = r.norm();
    if r_abs.is_zero() {
        // Degenerate: velocity equals the drift velocity, uniform linear motion
        return naive_step(field, particle, delta_time, last);
    }

    let center = &last.position + &r;

    // omega = -sign(B_z) * |Vc| / |R|; only sin/cos go through f64
    let omega = &(&v_circ_abs / &r_abs) * &Frac::from_int(-joint.b_z.sign());
    let delta_theta = (delta_time * &omega).to_f64();
    let sin = Frac::from_f64(delta_theta.sin()).unwrap_or_else(Frac::zero);
    let cos = Frac::from_f64(delta_theta.cos()).unwrap_or_else(Frac::one);

    // Rotate -R about the center by delta_theta, then add the drift displacement
    TrackPoint {
        time: &last.time + delta_time,
        position: FVec2 {
            x: &(&center.x + &(&(&r.y * &sin) - &(&cos * &r.x))) + &(&v_drift.x * delta_time),
            y: &(&center.y + &(&(-&(&cos * &r.y)) - &(&r.x * &sin))) + &(&v_drift.y * delta_time),
        },
        // Rotate the circular velocity, drift velocity unchanged
        v: FVec2 {
            x: &(&(&v_circ.x * &cos) - &(&v_circ.y * &sin)) + &v_drift.x,
            y: &(&(&v_circ.y * &cos) + &(&v_circ.x * &sin)) + &v_drift.y,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::field::{BFieldSpec, BorderOptions, CreateFieldAreaOptions, EFieldSpec};
    use crate::simulation::particle::ParticleOptions;

    fn uniform_field(ex: i64, ey: i64, bz: i64) -> Field {
        let mut field = Field::new();
        field
            .create_field_area(CreateFieldAreaOptions {
                border: BorderOptions::Everywhere,
                e: EFieldSpec::Constant(FVec2::new(Frac::from_int(ex), Frac::from_int(ey))),
                b: BFieldSpec::Constant(Frac::from_int(bz)),
            })
            .unwrap();
        field
    }

    fn unit_particle() -> Particle {
        Particle::new(ParticleOptions {
            mass: Some(Frac::one()),
            charge: Some(Frac::one()),
            v: Some(FVec2::new(Frac::from_int(2), Frac::from_int(3))),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn field_free_motion_is_exactly_straight_in_both_steppers() {
        let field = Field::new();
        let particle = unit_particle();
        let dt = Frac::ratio(1, 7);

        let mut naive = particle.starting_point().clone();
        let mut accurate = particle.starting_point().clone();
        for _ in 0..50 {
            naive = naive_step(&field, &particle, &dt, &naive);
            accurate = accurate_step(&field, &particle, &dt, &accurate);
        }
        let expected = TrackPoint {
            time: Frac::ratio(50, 7),
            position: FVec2::new(Frac::ratio(100, 7), Frac::ratio(150, 7)),
            v: FVec2::new(Frac::from_int(2), Frac::from_int(3)),
        };
        assert_eq!(naive, expected);
        assert_eq!(accurate, expected);
    }

    #[test]
    fn naive_step_uses_pre_update_velocity_for_position() {
        let field = uniform_field(1, 0, 0);
        let particle = unit_particle();
        let dt = Frac::one();
        let next = naive_step(&field, &particle, &dt, particle.starting_point());
        // position advanced by the old velocity only
        assert_eq!(next.position, FVec2::new(Frac::from_int(2), Frac::from_int(3)));
        // velocity picked up a = qE/m = (1, 0)
        assert_eq!(next.v, FVec2::new(Frac::from_int(3), Frac::from_int(3)));
        assert_eq!(next.time, Frac::one());
    }

    #[test]
    fn accurate_parabola_is_exact_for_any_step_size() {
        let field = uniform_field(2, -4, 0);
        let particle = unit_particle();
        let dt = Frac::from_int(5);
        let next = accurate_step(&field, &particle, &dt, particle.starting_point());
        // x = v*t + a*t^2/2 with a = (2, -4), v = (2, 3), t = 5
        assert_eq!(
            next.position,
            FVec2::new(Frac::from_int(2 * 5 + 25), Frac::from_int(3 * 5 - 50))
        );
        assert_eq!(next.v, FVec2::new(Frac::from_int(12), Frac::from_int(-17)));
    }

    #[test]
    fn naive_converges_to_accurate_parabola_as_dt_shrinks() {
        let field = uniform_field(1, 1, 0);
        let particle = unit_particle();

        let exact = accurate_step(&field, &particle, &Frac::one(), particle.starting_point());
        let mut gaps = Vec::new();
        for n in [10i64, 100, 1000] {
            let dt = Frac::ratio(1, n);
            let mut point = particle.starting_point().clone();
            for _ in 0..n {
                point = naive_step(&field, &particle, &dt, &point);
            }
            let gap = (&point.position - &exact.position).norm().to_f64();
            gaps.push(gap);
        }
        assert!(gaps[1] < gaps[0] / 5.0, "gaps: {:?}", gaps);
        assert!(gaps[2] < gaps[1] / 5.0, "gaps: {:?}", gaps);
        assert!(gaps[2] < 1e-2);
    }

    #[test]
    fn accurate_circular_motion_conserves_speed() {
        let field = uniform_field(0, 0, 1);
        let particle = unit_particle();
        let dt = Frac::ratio(3, 10);
        let speed0 = particle.starting_point().v.norm().to_f64();

        let mut point = particle.starting_point().clone();
        for _ in 0..200 {
            point = accurate_step(&field, &particle, &dt, &point);
            let speed = point.v.norm().to_f64();
            assert!(
                (speed - speed0).abs() < 1e-9 * speed0,
                "speed drifted: {} vs {}",
                speed,
                speed0
            );
        }
    }

    #[test]
    fn accurate_circular_motion_stays_on_the_gyrocircle() {
        // m=1, q=1, B=1, v=(2,3): gyroradius |v|, center at start + (v_y, -v_x)
        let field = uniform_field(0, 0, 1);
        let particle = unit_particle();
        let dt = Frac::ratio(1, 10);
        let center = (3.0, -2.0);
        let radius = (13.0f64).sqrt();

        let mut point = particle.starting_point().clone();
        for _ in 0..100 {
            point = accurate_step(&field, &particle, &dt, &point);
            let dx = point.position.x.to_f64() - center.0;
            let dy = point.position.y.to_f64() - center.1;
            let r = (dx * dx + dy * dy).sqrt();
            assert!((r - radius).abs() < 1e-9, "left the circle: {}", r);
        }
    }

    #[test]
    fn drift_velocity_is_a_fixed_point_of_the_accurate_step() {
        // E = (0, 2), B = 1 => V_drift = (E_y/B, -E_x/B) = (2, 0)
        let field = uniform_field(0, 2, 1);
        let particle = Particle::new(ParticleOptions {
            mass: Some(Frac::one()),
            charge: Some(Frac::one()),
            v: Some(FVec2::new(Frac::from_int(2), Frac::zero())),
            ..Default::default()
        })
        .unwrap();
        let dt = Frac::ratio(1, 4);

        // Zero circular radius: degenerate branch, uniform linear motion
        let next = accurate_step(&field, &particle, &dt, particle.starting_point());
        assert_eq!(next.v, particle.starting_point().v);
        assert_eq!(
            next.position,
            FVec2::new(Frac::ratio(1, 2), Frac::zero())
        );
    }

    #[test]
    fn zero_charge_in_magnetic_field_moves_straight() {
        let field = uniform_field(5, 5, 3);
        let particle = Particle::new(ParticleOptions {
            mass: Some(Frac::one()),
            charge: Some(Frac::zero()),
            v: Some(FVec2::new(Frac::one(), Frac::from_int(-2))),
            ..Default::default()
        })
        .unwrap();
        let dt = Frac::one();
        let next = accurate_step(&field, &particle, &dt, particle.starting_point());
        assert_eq!(next.position, FVec2::new(Frac::one(), Frac::from_int(-2)));
        assert_eq!(next.v, particle.starting_point().v);
    }
}
