//! Bounded Levenberg-Marquardt least squares.
//!
//! Minimizes ||r(x)||^2 for a user closure `r: R^p -> R^n` over a box
//! `lower <= x <= upper`. The Jacobian is built by forward differences
//! (falling back to backward steps at the upper bound), the damped normal
//! equations use Marquardt scaling `(J^T J + lambda*diag(J^T J)) dx = -J^T r`,
//! and candidate steps are clamped back into the box. A closure that fails
//! on a trial point simply gets that step rejected; only a failure at the
//! starting point is fatal.
//!
//! The final Jacobian is re-evaluated at the solution so callers can form
//! the covariance s^2 * (J^T J)^-1 for confidence intervals.

use crate::errors::KineticsError;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, Copy)]
pub struct LmConfig {
    pub max_iterations: usize,
    /// relative decrease of the cost below which iteration stops
    pub cost_tol: f64,
    /// relative step length below which iteration stops
    pub step_tol: f64,
    /// relative finite-difference step
    pub fd_step: f64,
    pub lambda0: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            cost_tol: 1e-10,
            step_tol: 1e-8,
            fd_step: 1e-6,
            lambda0: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub params: DVector<f64>,
    pub cost: f64,
    pub residuals: DVector<f64>,
    pub jacobian: DMatrix<f64>,
    pub iterations: usize,
    pub converged: bool,
}

fn clamp_to_box(x: &mut DVector<f64>, lower: &DVector<f64>, upper: &DVector<f64>) {
    for j in 0..x.len() {
        x[j] = x[j].clamp(lower[j], upper[j]);
    }
}

/// Forward-difference Jacobian; steps backward when the forward point would
/// leave the box.
fn finite_jacobian<F>(
    residual_fn: &mut F,
    x: &DVector<f64>,
    r0: &DVector<f64>,
    upper: &DVector<f64>,
    fd_step: f64,
) -> Result<DMatrix<f64>, KineticsError>
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>, KineticsError>,
{
    let (n, p) = (r0.len(), x.len());
    let mut jac = DMatrix::zeros(n, p);
    for j in 0..p {
        let mut h = fd_step * x[j].abs().max(1.0);
        if x[j] + h > upper[j] {
            h = -h;
        }
        let mut xh = x.clone();
        xh[j] += h;
        let rh = residual_fn(&xh)?;
        for i in 0..n {
            jac[(i, j)] = (rh[i] - r0[i]) / h;
        }
    }
    Ok(jac)
}

pub fn minimize<F>(
    mut residual_fn: F,
    x0: DVector<f64>,
    lower: DVector<f64>,
    upper: DVector<f64>,
    config: LmConfig,
) -> Result<LmOutcome, KineticsError>
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>, KineticsError>,
{
    let p = x0.len();
    if lower.len() != p || upper.len() != p {
        return Err(KineticsError::InvalidInput(format!(
            "bound dimension mismatch: {} parameters, {} lower, {} upper",
            p,
            lower.len(),
            upper.len()
        )));
    }
    for j in 0..p {
        if !(lower[j] < upper[j]) {
            return Err(KineticsError::InvalidInput(format!(
                "lower bound {} must be below upper bound {} (parameter {})",
                lower[j], upper[j], j
            )));
        }
    }

    let mut x = x0;
    clamp_to_box(&mut x, &lower, &upper);
    let mut r = residual_fn(&x)
        .map_err(|e| KineticsError::Calibration(format!("residuals failed at start: {}", e)))?;
    let mut cost = r.norm_squared();
    let mut lambda = config.lambda0;
    let mut converged = false;
    let mut iterations = 0;
    info!("LM start: p = {}, n = {}, cost = {:.6e}", p, r.len(), cost);

    for it in 0..config.max_iterations {
        iterations = it + 1;
        let jac = match finite_jacobian(&mut residual_fn, &x, &r, &upper, config.fd_step) {
            Ok(j) => j,
            Err(e) => {
                warn!("LM stopped: Jacobian evaluation failed ({})", e);
                break;
            }
        };
        let jtj = jac.transpose() * &jac;
        let jtr = jac.transpose() * &r;

        let mut accepted = false;
        while lambda < 1e12 {
            let mut damped = jtj.clone();
            for j in 0..p {
                damped[(j, j)] += lambda * jtj[(j, j)].max(1e-30);
            }
            let Some(step) = damped.lu().solve(&(-&jtr)) else {
                lambda *= 10.0;
                continue;
            };
            let mut x_new = &x + &step;
            clamp_to_box(&mut x_new, &lower, &upper);
            let Ok(r_new) = residual_fn(&x_new) else {
                lambda *= 10.0;
                continue;
            };
            let cost_new = r_new.norm_squared();
            if cost_new < cost {
                let cost_drop = cost - cost_new;
                let step_len = (&x_new - &x).norm();
                debug!(
                    "LM iter {}: cost {:.6e} -> {:.6e}, lambda {:.1e}",
                    it, cost, cost_new, lambda
                );
                x = x_new;
                r = r_new;
                cost = cost_new;
                lambda = (lambda / 10.0).max(1e-12);
                accepted = true;
                if cost_drop <= config.cost_tol * cost.max(1e-30)
                    || step_len <= config.step_tol * (x.norm() + config.step_tol)
                {
                    converged = true;
                }
                break;
            }
            lambda *= 10.0;
        }

        if !accepted {
            // damping exhausted: at a minimum if the gradient is flat
            converged = jtr.amax() <= 1e-8 * cost.max(1.0);
            break;
        }
        if converged {
            break;
        }
    }

    let jacobian = finite_jacobian(&mut residual_fn, &x, &r, &upper, config.fd_step)
        .map_err(|e| KineticsError::Calibration(format!("final Jacobian failed: {}", e)))?;
    info!(
        "LM finished after {} iterations: cost = {:.6e}, converged = {}",
        iterations, cost, converged
    );
    Ok(LmOutcome {
        params: x,
        cost,
        residuals: r,
        jacobian,
        iterations,
        converged,
    })
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    fn exp_decay_residuals(
        x: &DVector<f64>,
        t: &[f64],
        y: &[f64],
    ) -> Result<DVector<f64>, KineticsError> {
        Ok(DVector::from_iterator(
            t.len(),
            t.iter()
                .zip(y)
                .map(|(&ti, &yi)| x[0] * (-x[1] * ti).exp() - yi),
        ))
    }

    #[test]
    fn test_recovers_exponential_decay() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = t.iter().map(|&ti| 2.5 * (-0.7 * ti).exp()).collect();
        let out = minimize(
            |x| exp_decay_residuals(x, &t, &y),
            dvector![1.0, 0.1],
            dvector![0.1, 0.01],
            dvector![10.0, 5.0],
            LmConfig::default(),
        )
        .unwrap();
        assert!(out.converged);
        assert_relative_eq!(out.params[0], 2.5, max_relative = 1e-6);
        assert_relative_eq!(out.params[1], 0.7, max_relative = 1e-6);
        assert!(out.cost < 1e-12);
        assert_eq!(out.jacobian.nrows(), 20);
        assert_eq!(out.jacobian.ncols(), 2);
    }

    #[test]
    fn test_solution_respects_bounds() {
        // unconstrained optimum at x = 3, box ends at 2
        let out = minimize(
            |x| Ok(dvector![x[0] - 3.0]),
            dvector![0.5],
            dvector![0.0],
            dvector![2.0],
            LmConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(out.params[0], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_failing_start_is_fatal() {
        let result = minimize(
            |_x| -> Result<DVector<f64>, KineticsError> {
                Err(KineticsError::IntegrationFailure("boom".to_string()))
            },
            dvector![1.0],
            dvector![0.0],
            dvector![2.0],
            LmConfig::default(),
        );
        assert!(matches!(result, Err(KineticsError::Calibration(_))));
    }

    #[test]
    fn test_bad_bounds_rejected() {
        let result = minimize(
            |x| Ok(dvector![x[0]]),
            dvector![1.0],
            dvector![2.0],
            dvector![0.0],
            LmConfig::default(),
        );
        assert!(matches!(result, Err(KineticsError::InvalidInput(_))));
    }

    #[test]
    fn test_iteration_cap_reports_not_converged() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = t.iter().map(|&ti| 2.5 * (-0.7 * ti).exp()).collect();
        let out = minimize(
            |x| exp_decay_residuals(x, &t, &y),
            dvector![1.0, 0.1],
            dvector![0.1, 0.01],
            dvector![10.0, 5.0],
            LmConfig {
                max_iterations: 1,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 1);
    }
}
