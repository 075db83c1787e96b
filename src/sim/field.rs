//! Piecewise field law of the two-dee cyclotron.
//!
//! The dees are circles of radius `dee_radius` centred at `(∓gap/2, 0)`,
//! each restricted to its own side of the gap. Inside a dee only the
//! magnetic field acts; in the gap the alternating electric field is added
//! along x; everywhere else the particle moves freely.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::params::{ParticleState, PhysicalParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    LeftDee,
    RightDee,
    Gap,
    Outside,
}

impl Region {
    /// Dee membership wins on the seam `x = ±gap/2`; the gap is open.
    pub fn classify(x: f64, y: f64, p: &PhysicalParameters) -> Region {
        let half = p.gap / 2.0;
        let r2 = p.dee_radius * p.dee_radius;
        if x <= -half && (x + half).powi(2) + y * y <= r2 {
            Region::LeftDee
        } else if x >= half && (x - half).powi(2) + y * y <= r2 {
            Region::RightDee
        } else if x > -half && x < half && y > -p.dee_radius && y < p.dee_radius {
            Region::Gap
        } else {
            Region::Outside
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::LeftDee => "left dee",
            Region::RightDee => "right dee",
            Region::Gap => "gap",
            Region::Outside => "outside",
        }
    }
}

/// Unit square wave: +1 on the first half of each 2π period, -1 on the second.
pub fn square_wave(phase: f64) -> f64 {
    if phase.rem_euclid(TAU) < PI {
        1.0
    } else {
        -1.0
    }
}

/// Signed electric field across the gap at time `t` (V/m). The dee voltage
/// flips every half turn, in phase with the particle's rotation.
pub fn gap_field(p: &PhysicalParameters, t: f64) -> f64 {
    p.amplitude * square_wave(p.cyclotron_frequency() * t + FRAC_PI_2)
}

pub fn acceleration(t: f64, s: &ParticleState, p: &PhysicalParameters) -> (f64, f64) {
    let qm = p.charge_to_mass();
    match Region::classify(s.x, s.y, p) {
        Region::LeftDee | Region::RightDee => (qm * p.field * s.vy, -(qm * p.field * s.vx)),
        Region::Gap => (
            qm * p.field * s.vy + qm * gap_field(p, t),
            -(qm * p.field * s.vx),
        ),
        Region::Outside => (0.0, 0.0),
    }
}

/// Right-hand side `[vx, vy, ax, ay]` of the first-order system.
pub fn derivative(t: f64, z: &[f64; 4], p: &PhysicalParameters) -> [f64; 4] {
    let s = ParticleState::from_array(*z);
    let (ax, ay) = acceleration(t, &s, p);
    [s.vx, s.vy, ax, ay]
}
