//! Initial-value solvers for the four-component particle system.
//!
//! Both solvers take a right-hand side `f(t, z)`, a start state and a time
//! window `[t0, t1]`, and return only the state at `t1`.

use serde::Deserialize;
use thiserror::Error;

pub type StateVec = [f64; 4];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrateError {
    #[error("state became non-finite at t = {t:.3e} s")]
    NonFinite { t: f64 },
    #[error("step size underflow at t = {t:.3e} s (h = {h:.3e} s)")]
    StepUnderflow { t: f64, h: f64 },
    #[error("no convergence within {max_steps} steps")]
    TooManySteps { max_steps: usize },
}

/// Which method advances the state, selected by `integrator.method` in the
/// configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Solver {
    /// Classical Runge–Kutta, `substeps` fixed steps per window.
    Rk4 {
        #[serde(default = "default_substeps")]
        substeps: usize,
    },
    /// Adaptive Dormand–Prince 5(4) with mixed error control.
    Dopri5 {
        #[serde(default = "default_rtol")]
        rtol: f64,
        #[serde(default = "default_atol")]
        atol: f64,
        #[serde(default = "default_max_steps")]
        max_steps: usize,
    },
}

fn default_substeps() -> usize {
    8
}

fn default_rtol() -> f64 {
    1e-8
}

fn default_atol() -> f64 {
    1e-12
}

fn default_max_steps() -> usize {
    20_000
}

impl Default for Solver {
    fn default() -> Self {
        Solver::Dopri5 {
            rtol: default_rtol(),
            atol: default_atol(),
            max_steps: default_max_steps(),
        }
    }
}

impl Solver {
    pub fn name(&self) -> &'static str {
        match self {
            Solver::Rk4 { .. } => "rk4",
            Solver::Dopri5 { .. } => "dopri5",
        }
    }

    pub fn advance<F>(&self, rhs: F, t0: f64, y0: StateVec, t1: f64) -> Result<StateVec, IntegrateError>
    where
        F: Fn(f64, &StateVec) -> StateVec,
    {
        if !is_finite(&y0) {
            return Err(IntegrateError::NonFinite { t: t0 });
        }
        match *self {
            Solver::Rk4 { substeps } => rk4(&rhs, t0, y0, t1, substeps.max(1)),
            Solver::Dopri5 { rtol, atol, max_steps } => {
                dopri5(&rhs, t0, y0, t1, rtol, atol, max_steps)
            }
        }
    }
}

fn is_finite(z: &StateVec) -> bool {
    z.iter().all(|v| v.is_finite())
}

/// `y + h * Σ c_i k_i`
fn combine(y: &StateVec, h: f64, terms: &[(f64, &StateVec)]) -> StateVec {
    let mut out = *y;
    for (j, slot) in out.iter_mut().enumerate() {
        let sum: f64 = terms.iter().map(|(c, k)| c * k[j]).sum();
        *slot += h * sum;
    }
    out
}

fn rk4<F>(rhs: &F, t0: f64, y0: StateVec, t1: f64, substeps: usize) -> Result<StateVec, IntegrateError>
where
    F: Fn(f64, &StateVec) -> StateVec,
{
    let h = (t1 - t0) / substeps as f64;
    let mut y = y0;
    for i in 0..substeps {
        let t = t0 + i as f64 * h;
        let k1 = rhs(t, &y);
        let k2 = rhs(t + 0.5 * h, &combine(&y, 0.5 * h, &[(1.0, &k1)]));
        let k3 = rhs(t + 0.5 * h, &combine(&y, 0.5 * h, &[(1.0, &k2)]));
        let k4 = rhs(t + h, &combine(&y, h, &[(1.0, &k3)]));
        y = combine(
            &y,
            h / 6.0,
            &[(1.0, &k1), (2.0, &k2), (2.0, &k3), (1.0, &k4)],
        );
        if !is_finite(&y) {
            return Err(IntegrateError::NonFinite { t: t + h });
        }
    }
    Ok(y)
}

// Dormand–Prince tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth-order minus embedded fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

fn dopri5<F>(
    rhs: &F,
    t0: f64,
    y0: StateVec,
    t1: f64,
    rtol: f64,
    atol: f64,
    max_steps: usize,
) -> Result<StateVec, IntegrateError>
where
    F: Fn(f64, &StateVec) -> StateVec,
{
    let span = t1 - t0;
    if span == 0.0 {
        return Ok(y0);
    }
    let dir = span.signum();
    let mut t = t0;
    let mut y = y0;
    let mut h = span;
    let mut k1 = rhs(t, &y);

    for _ in 0..max_steps {
        let remaining = t1 - t;
        let last = h * dir >= remaining * dir;
        if last {
            h = remaining;
        }
        let min_step = 16.0 * f64::EPSILON * t.abs().max(span.abs());
        if h.abs() < min_step {
            return Err(IntegrateError::StepUnderflow { t, h });
        }

        let k2 = rhs(t + C2 * h, &combine(&y, h, &[(A21, &k1)]));
        let k3 = rhs(t + C3 * h, &combine(&y, h, &[(A31, &k1), (A32, &k2)]));
        let k4 = rhs(
            t + C4 * h,
            &combine(&y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
        );
        let k5 = rhs(
            t + C5 * h,
            &combine(&y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        );
        let k6 = rhs(
            t + h,
            &combine(
                &y,
                h,
                &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        );
        let y_new = combine(
            &y,
            h,
            &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = rhs(t + h, &y_new);

        let mut err = 0.0_f64;
        for j in 0..4 {
            let e = h * (E1 * k1[j] + E3 * k3[j] + E4 * k4[j] + E5 * k5[j] + E6 * k6[j] + E7 * k7[j]);
            let tol = atol + rtol * y[j].abs().max(y_new[j].abs());
            err += (e / tol).powi(2);
        }
        let err = (err / 4.0).sqrt();

        if !err.is_finite() || !is_finite(&y_new) {
            h *= MIN_FACTOR;
            continue;
        }

        if err <= 1.0 {
            t = if last { t1 } else { t + h };
            y = y_new;
            k1 = k7;
            if last {
                return Ok(y);
            }
        }

        let factor = if err == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
        };
        h *= factor;
    }
    Err(IntegrateError::TooManySteps { max_steps })
}
