use std::f64::consts::TAU;

use super::field::{gap_field, Region};
use super::params::{ParticleState, PhysicalParameters, ELEMENTARY_CHARGE, SPEED_OF_LIGHT};

/// Derived quantities shown beside the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitors {
    pub region: Region,
    /// Signed gap field at the current time (V/m), whatever the region.
    pub gap_field: f64,
    pub vx: f64,
    pub vy: f64,
    /// Rotation period 2π/|ω| (s).
    pub period: f64,
    /// Speed (m/s).
    pub speed: f64,
    /// Momentum γmv (eV/c).
    pub momentum: f64,
    /// Kinetic energy (γ-1)mc² (eV).
    pub kinetic_energy: f64,
    pub gamma: f64,
    /// Orbit radius γmv/(|q|B) in the dees (m).
    pub radius: f64,
}

impl Monitors {
    pub fn measure(state: &ParticleState, physics: &PhysicalParameters, t: f64) -> Self {
        let speed = state.speed();
        let beta2 = (speed / SPEED_OF_LIGHT).powi(2);
        let gamma = 1.0 / (1.0 - beta2).sqrt();
        // γ-1 written as β²γ²/(γ+1) so slow particles keep their energy
        let gamma_minus_one = beta2 * gamma * gamma / (gamma + 1.0);
        let rest_energy = physics.mass * SPEED_OF_LIGHT * SPEED_OF_LIGHT;
        let momentum = gamma * physics.mass * speed;
        let radius = if momentum == 0.0 {
            0.0
        } else {
            momentum / (physics.charge * physics.field).abs()
        };
        Self {
            region: Region::classify(state.x, state.y, physics),
            gap_field: gap_field(physics, t),
            vx: state.vx,
            vy: state.vy,
            period: (TAU / physics.cyclotron_frequency()).abs(),
            speed,
            momentum: momentum * SPEED_OF_LIGHT / ELEMENTARY_CHARGE,
            kinetic_energy: gamma_minus_one * rest_energy / ELEMENTARY_CHARGE,
            gamma,
            radius,
        }
    }

    pub fn lines(&self) -> [String; 9] {
        [
            format!("Region: {}", self.region.label()),
            format!("E = {:.3e} V/m", self.gap_field),
            format!("vx = {:.2e}  vy = {:.2e}", self.vx, self.vy),
            format!("v = {:.3e} m/s", self.speed),
            format!("R = {:.3e} m", self.radius),
            format!("T = {:.3e} s", self.period),
            format!("p = {:.3e} keV/c", self.momentum / 1e3),
            format!("K = {:.3e} keV", self.kinetic_energy / 1e3),
            format!("\u{03B3} = {:.3e}", self.gamma),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::params::Setup;

    #[test]
    fn proton_at_rest() {
        let setup = Setup::default();
        let m = Monitors::measure(&setup.initial_state(), &setup.physics(), 0.0);
        assert_eq!(m.speed, 0.0);
        assert_eq!(m.gamma, 1.0);
        assert_eq!(m.kinetic_energy, 0.0);
        let expected_period = TAU * setup.mass / (setup.charge * setup.field);
        assert!((m.period - expected_period).abs() / expected_period < 1e-12);
    }

    #[test]
    fn slow_particle_matches_classical_limit() {
        let physics = Setup::default().physics();
        let state = ParticleState { x: 0.0, y: 0.0, vx: 3e4, vy: 4e4 };
        let m = Monitors::measure(&state, &physics, 0.0);
        assert!((m.speed - 5e4).abs() < 1e-9);
        let classical_k = 0.5 * physics.mass * 5e4f64.powi(2) / ELEMENTARY_CHARGE;
        assert!((m.kinetic_energy - classical_k).abs() / classical_k < 1e-6);
        let classical_p = physics.mass * 5e4 * SPEED_OF_LIGHT / ELEMENTARY_CHARGE;
        assert!((m.momentum - classical_p).abs() / classical_p < 1e-6);
    }

    #[test]
    fn period_ignores_charge_sign() {
        let mut physics = Setup::default().physics();
        let positive = Monitors::measure(&ParticleState::default(), &physics, 0.0).period;
        physics.charge = -physics.charge;
        let negative = Monitors::measure(&ParticleState::default(), &physics, 0.0).period;
        assert_eq!(positive, negative);
    }

    #[test]
    fn centre_of_the_gap_at_start() {
        let setup = Setup::default();
        let m = Monitors::measure(&setup.initial_state(), &setup.physics(), 0.0);
        assert_eq!(m.region, Region::Gap);
        assert_eq!(m.gap_field, setup.amplitude);
        assert_eq!(m.radius, 0.0);
    }

    #[test]
    fn field_flips_after_half_a_turn() {
        let physics = Setup::default().physics();
        let half_turn = std::f64::consts::PI / physics.cyclotron_frequency();
        let m = Monitors::measure(&ParticleState::default(), &physics, half_turn * 1.01);
        assert_eq!(m.gap_field, -physics.amplitude);
    }

    #[test]
    fn radius_matches_v_over_omega_when_slow() {
        let physics = Setup::default().physics();
        let state = ParticleState { x: 0.2, y: 0.0, vx: 0.0, vy: 2e4 };
        let m = Monitors::measure(&state, &physics, 0.0);
        assert_eq!(m.region, Region::RightDee);
        assert_eq!((m.vx, m.vy), (0.0, 2e4));
        let classical = 2e4 / physics.cyclotron_frequency();
        assert!((m.radius - classical).abs() / classical < 1e-6);
    }

    #[test]
    fn radius_is_unbounded_without_magnetic_field() {
        let mut physics = Setup::default().physics();
        physics.field = 0.0;
        let state = ParticleState { vx: 1.0, ..ParticleState::default() };
        assert!(Monitors::measure(&state, &physics, 0.0).radius.is_infinite());
    }

    #[test]
    fn formatted_lines() {
        let m = Monitors {
            region: Region::Outside,
            gap_field: -10.0,
            vx: 1500.0,
            vy: -2.0,
            period: 6.5e-5,
            speed: 0.0,
            momentum: 2000.0,
            kinetic_energy: 0.0,
            gamma: 1.0,
            radius: 0.25,
        };
        let lines = m.lines();
        assert_eq!(lines[0], "Region: outside");
        assert_eq!(lines[1], "E = -1.000e1 V/m");
        assert_eq!(lines[2], "vx = 1.50e3  vy = -2.00e0");
        assert_eq!(lines[4], "R = 2.500e-1 m");
        assert_eq!(lines[5], "T = 6.500e-5 s");
        assert_eq!(lines[6], "p = 2.000e0 keV/c");
        assert_eq!(lines[8], "\u{03B3} = 1.000e0");
    }
}
