//! Conjugate-gradient minimizer with a Wolfe–Powell line search.
//!
//! Polack–Ribière direction updates with quadratic/cubic interpolation and
//! cubic extrapolation inside the line search; gradient history stands in
//! for curvature, so no Hessian is ever formed. The minimizer is stepwise:
//! each [`CgMinimizer::step`] runs exactly one outer iteration, letting an
//! external driver interleave progress reporting and convergence tests.

use crate::optim::objective::CostFunction;

// Line-search constants: Wolfe–Powell thresholds, bracket interpolation
// limit, extrapolation limit, evaluation cap, and the slope-ratio cap used
// to seed the next step size.
const RHO: f64 = 0.01;
const SIG: f64 = 0.5;
const INT: f64 = 0.1;
const EXT: f64 = 3.0;
const MAX_EVALS: usize = 20;
const RATIO: f64 = 100.0;

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn axpy(dst: &mut [f64], a: f64, x: &[f64]) {
    for (d, v) in dst.iter_mut().zip(x) {
        *d += a * v;
    }
}

/// Iterative line-search minimizer over a flat parameter vector.
///
/// Owns the current point, its cost and gradient, the search direction, and
/// its own iteration count. `new` performs the initial evaluation; `step`
/// advances one outer iteration. Two consecutive line-search failures stall
/// the minimizer: further steps keep counting but no longer move the point,
/// so a driver's epoch cap still terminates the run.
pub struct CgMinimizer {
    x: Vec<f64>,
    f1: f64,
    df1: Vec<f64>,
    s: Vec<f64>,
    d1: f64,
    z1: f64,
    iterations: usize,
    ls_failed: bool,
    stalled: bool,
}

impl CgMinimizer {
    /// Evaluates the objective at `x0` and seeds a steepest-descent search
    /// direction.
    pub fn new<F: CostFunction>(objective: &mut F, x0: Vec<f64>) -> CgMinimizer {
        let (f1, df1) = objective.evaluate(&x0);
        let s: Vec<f64> = df1.iter().map(|g| -g).collect();
        let d1 = -dot(&s, &s);
        let z1 = 1.0 / (1.0 - d1);

        CgMinimizer {
            x: x0,
            f1,
            df1,
            s,
            d1,
            z1,
            iterations: 0,
            ls_failed: false,
            stalled: false,
        }
    }

    /// The current (accepted, not trial) parameter vector.
    pub fn params(&self) -> &[f64] {
        &self.x
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Objective value at the current point.
    pub fn cost(&self) -> f64 {
        self.f1
    }

    /// One outer iteration: a Wolfe–Powell line search along the current
    /// direction, then a Polack–Ribière direction update. A failed search
    /// restores the pre-search point and restarts along steepest descent; a
    /// second consecutive failure stalls the minimizer.
    pub fn step<F: CostFunction>(&mut self, objective: &mut F) {
        self.iterations += 1;

        if self.stalled {
            return;
        }

        // Snapshot for restoration if the line search fails.
        let x0 = self.x.clone();
        let f0 = self.f1;
        let df0 = self.df1.clone();

        let mut z1 = self.z1;
        axpy(&mut self.x, z1, &self.s);
        let (mut f2, mut df2) = objective.evaluate(&self.x);
        let mut d2 = dot(&df2, &self.s);

        // One end of the bracket tracks the pre-search point.
        let mut f3 = self.f1;
        let mut d3 = self.d1;
        let mut z3 = -z1;

        let mut evals = MAX_EVALS;
        let mut limit = -1.0_f64;
        let success;

        loop {
            // Shrink the bracket while the Wolfe conditions fail.
            while ((f2 > self.f1 + z1 * RHO * self.d1) || (d2 > -SIG * self.d1)) && evals > 0 {
                limit = z1;

                let mut z2 = if f2 > self.f1 {
                    // Quadratic fit through f3, d3, f2.
                    z3 - (0.5 * d3 * z3 * z3) / (d3 * z3 + f2 - f3)
                } else {
                    // Cubic fit through f3, d3, f2, d2.
                    let a = 6.0 * (f2 - f3) / z3 + 3.0 * (d2 + d3);
                    let b = 3.0 * (f3 - f2) - z3 * (d3 + 2.0 * d2);
                    ((b * b - a * d2 * z3 * z3).sqrt() - b) / a
                };

                if !z2.is_finite() {
                    z2 = z3 / 2.0;
                }

                // Keep the step inside the bracket, away from both ends.
                z2 = z2.min(INT * z3).max((1.0 - INT) * z3);

                z1 += z2;
                axpy(&mut self.x, z2, &self.s);

                let (nf2, ndf2) = objective.evaluate(&self.x);
                f2 = nf2;
                df2 = ndf2;
                evals -= 1;

                d2 = dot(&df2, &self.s);
                z3 -= z2;
            }

            if f2 > self.f1 + z1 * RHO * self.d1 || d2 > -SIG * self.d1 {
                success = false;
                break;
            } else if d2 > SIG * self.d1 {
                success = true;
                break;
            } else if evals == 0 {
                success = false;
                break;
            }

            // Wolfe conditions not yet decidable: extrapolate with a cubic.
            let a = 6.0 * (f2 - f3) / z3 + 3.0 * (d2 + d3);
            let b = 3.0 * (f3 - f2) - z3 * (d3 + 2.0 * d2);
            let mut z2 = -d2 * z3 * z3 / (b + (b * b - a * d2 * z3 * z3).sqrt());

            if !z2.is_finite() || z2 < 0.0 {
                z2 = if limit < -0.5 {
                    z1 * (EXT - 1.0)
                } else {
                    (limit - z1) / 2.0
                };
            } else if limit > -0.5 && z2 + z1 > limit {
                z2 = (limit - z1) / 2.0;
            } else if limit < -0.5 && z2 + z1 > z1 * EXT {
                z2 = z1 * (EXT - 1.0);
            } else if z2 < -z3 * INT {
                z2 = -z3 * INT;
            } else if limit > -0.5 && z2 < (limit - z1) * (1.0 - INT) {
                z2 = (limit - z1) * (1.0 - INT);
            }

            f3 = f2;
            d3 = d2;
            z3 = -z2;
            z1 += z2;
            axpy(&mut self.x, z2, &self.s);

            let (nf2, ndf2) = objective.evaluate(&self.x);
            f2 = nf2;
            df2 = ndf2;
            evals -= 1;

            d2 = dot(&df2, &self.s);
        }

        if success {
            self.f1 = f2;

            // Polack–Ribière direction update.
            let coef =
                (dot(&df2, &df2) - dot(&self.df1, &df2)) / dot(&self.df1, &self.df1);
            for (si, g) in self.s.iter_mut().zip(df2.iter()) {
                *si = coef * *si - g;
            }
            self.df1 = df2;

            let mut slope = dot(&self.df1, &self.s);
            if slope > 0.0 {
                // Not a descent direction; fall back to steepest descent.
                for (si, g) in self.s.iter_mut().zip(self.df1.iter()) {
                    *si = -g;
                }
                slope = -dot(&self.s, &self.s);
            }

            // Seed the next step size from the slope ratio, capped.
            self.z1 = z1 * (self.d1 / (slope - f64::MIN_POSITIVE)).min(RATIO);
            self.d1 = slope;
            self.ls_failed = false;
        } else {
            self.x = x0;
            self.f1 = f0;
            self.df1 = df0;

            if self.ls_failed {
                self.stalled = true;
                return;
            }

            // Restart along steepest descent from the restored point.
            for (si, g) in self.s.iter_mut().zip(self.df1.iter()) {
                *si = -g;
            }
            self.d1 = -dot(&self.s, &self.s);
            self.z1 = 1.0 / (1.0 - self.d1);
            self.ls_failed = true;
        }
    }
}
