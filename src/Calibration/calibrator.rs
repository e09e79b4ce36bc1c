//! Calibration of Arrhenius parameters against conversion time series.
//!
//! # Problem Description
//! Given one or more `Experiment` records at different temperatures, find
//! the pre-exponential factor A and activation energy Ea of the 1-step
//! transesterification network that minimize the sum of squared deviations
//! between simulated and observed conversion. The fit is performed in
//! (log10(A), Ea) space so the parameter magnitudes are comparable; an
//! optional reverse rate pair can be fitted as well.
//!
//! Two algorithms are available: `Local` runs bounded Levenberg-Marquardt
//! from the initial guess; `Global` first explores the bounded parameter
//! space with seeded differential evolution and then polishes the best
//! candidate with Levenberg-Marquardt.
//!
//! A fit that stalls is not an error: the outcome carries the best
//! parameters found with `converged = false`. Goodness of fit is reported
//! as R^2, RMSE and MAE over the pooled residuals, with 95 % confidence
//! intervals from the linearized covariance s^2 (J^T J)^-1 and a Student-t
//! quantile.
//!
//! # Usage
//! ```rust, ignore
//! let mut cal = ParameterCalibrator::new();
//! cal.set_experiments(ExperimentSet::kouzu_reference());
//! let outcome = cal.calibrate()?;
//! outcome.print_report();
//! ```

use crate::Calibration::experiment_data::{Experiment, ExperimentSet};
use crate::Calibration::levenberg_marquardt::{self, LmConfig};
use crate::Kinetics::arrhenius::{KineticParameters, StepParameters};
use crate::Kinetics::reaction_network::{ConcentrationState, ReactionTopology};
use crate::Kinetics::transesterification_IVP::{Trajectory, TransesterificationIVP};
use crate::Optimization::differential_evolution::DifferentialEvolution;
use crate::errors::KineticsError;
use RustedSciThe::numerical::ODE_api2::SolverParam;
use log::{info, warn};
use nalgebra::DVector;
use prettytable::{Table, row};
use std::collections::HashMap;

/// Residual assigned to every point of an experiment whose simulation
/// failed; large but finite so the search can move away from the region.
const PENALTY_RESIDUAL: f64 = 1.0e3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitAlgorithm {
    Local,
    Global,
}

#[derive(Debug, Clone)]
pub struct FitConfig {
    pub algorithm: FitAlgorithm,
    /// bounds on the pre-exponential factor, L/(mol*min)
    pub bounds_A: (f64, f64),
    /// bounds on the activation energy, kJ/mol
    pub bounds_Ea: (f64, f64),
    pub initial_A: f64,
    pub initial_Ea: f64,
    /// also fit a reverse rate pair (same bounds as the forward one)
    pub fit_reverse: bool,
    pub confidence_level: f64,
    pub seed: u64,
    pub de_population: usize,
    pub de_generations: usize,
    pub lm: LmConfig,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            algorithm: FitAlgorithm::Local,
            bounds_A: (1.0e5, 1.0e15),
            bounds_Ea: (20.0, 200.0),
            initial_A: 1.0e6,
            initial_Ea: 60.0,
            fit_reverse: false,
            confidence_level: 0.95,
            seed: 42,
            de_population: 15,
            de_generations: 30,
            lm: LmConfig {
                // coarser than the default so finite differences stay above
                // the integration tolerance
                fd_step: 1e-4,
                ..Default::default()
            },
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), KineticsError> {
        if self.bounds_A.0 <= 0.0 || self.bounds_A.0 >= self.bounds_A.1 {
            return Err(KineticsError::InvalidInput(format!(
                "A bounds must satisfy 0 < lo < hi, got ({:e}, {:e})",
                self.bounds_A.0, self.bounds_A.1
            )));
        }
        if self.bounds_Ea.0 <= 0.0 || self.bounds_Ea.0 >= self.bounds_Ea.1 {
            return Err(KineticsError::InvalidInput(format!(
                "Ea bounds must satisfy 0 < lo < hi, got ({}, {})",
                self.bounds_Ea.0, self.bounds_Ea.1
            )));
        }
        if !(0.0 < self.confidence_level && self.confidence_level < 1.0) {
            return Err(KineticsError::InvalidInput(format!(
                "confidence level must lie in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfidenceInterval {
    pub name: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone)]
pub struct CalibrationOutcome {
    pub params: KineticParameters,
    pub converged: bool,
    pub algorithm: FitAlgorithm,
    pub r_squared: f64,
    pub rmse: f64,
    pub mae: f64,
    pub intervals: Vec<ConfidenceInterval>,
    pub iterations: usize,
    pub n_points: usize,
    pub message: String,
}

impl CalibrationOutcome {
    pub fn report_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["parameter", "value", "lower 95%", "upper 95%"]);
        for ci in &self.intervals {
            table.add_row(row![
                ci.name,
                format!("{:.4e}", ci.value),
                format!("{:.4e}", ci.lower),
                format!("{:.4e}", ci.upper)
            ]);
        }
        table.add_row(row!["R^2", format!("{:.4}", self.r_squared), "", ""]);
        table.add_row(row!["RMSE, %", format!("{:.3}", self.rmse), "", ""]);
        table.add_row(row!["MAE, %", format!("{:.3}", self.mae), "", ""]);
        table.add_row(row!["converged", self.converged, "", ""]);
        table
    }

    pub fn print_report(&self) {
        self.report_table().printstd();
    }
}

pub struct ParameterCalibrator {
    experiments: Option<ExperimentSet>,
    config: FitConfig,
}

impl Default for ParameterCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterCalibrator {
    pub fn new() -> Self {
        Self {
            experiments: None,
            config: FitConfig::default(),
        }
    }

    pub fn set_experiments(&mut self, experiments: ExperimentSet) {
        self.experiments = Some(experiments);
    }

    pub fn set_config(&mut self, config: FitConfig) -> Result<(), KineticsError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn n_fit_params(&self) -> usize {
        if self.config.fit_reverse { 4 } else { 2 }
    }

    /// (log10 A, Ea) per fitted rate pair.
    fn theta_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let (a_lo, a_hi) = self.config.bounds_A;
        let (e_lo, e_hi) = self.config.bounds_Ea;
        let p = self.n_fit_params();
        let mut lower = DVector::zeros(p);
        let mut upper = DVector::zeros(p);
        for pair in 0..p / 2 {
            lower[2 * pair] = a_lo.log10();
            upper[2 * pair] = a_hi.log10();
            lower[2 * pair + 1] = e_lo;
            upper[2 * pair + 1] = e_hi;
        }
        (lower, upper)
    }

    fn params_from_theta(&self, theta: &DVector<f64>) -> Result<KineticParameters, KineticsError> {
        let step = if self.config.fit_reverse {
            StepParameters::reversible(
                10f64.powf(theta[0]),
                theta[1],
                10f64.powf(theta[2]),
                theta[3],
            )?
        } else {
            StepParameters::irreversible(10f64.powf(theta[0]), theta[1])?
        };
        Ok(KineticParameters::OneStep(step))
    }

    /// Pooled residuals (simulated - observed conversion, %) over all
    /// experiments. A failed integration fills that experiment's slots with
    /// a large finite penalty instead of aborting the search.
    fn residuals(&self, theta: &DVector<f64>) -> Result<DVector<f64>, KineticsError> {
        let set = self
            .experiments
            .as_ref()
            .ok_or_else(|| KineticsError::MissingData("no experiments set".to_string()))?;
        let params = self.params_from_theta(theta)?;
        let mut out: Vec<f64> = Vec::with_capacity(set.n_points());
        for exp in &set.experiments {
            let t_final = *exp.times.last().unwrap_or(&0.0);
            let feed =
                ConcentrationState::fresh_feed(ReactionTopology::OneStep, exp.c_tg0, exp.molar_ratio)?;
            let mut ivp = TransesterificationIVP::default_solver();
            // tight mesh so linear interpolation onto the sampling times
            // does not bias the fit
            ivp.set_solver_params(HashMap::from([(
                "max_step".to_owned(),
                SolverParam::Float(0.5),
            )]));
            ivp.set_problem(params, exp.temperature, feed, t_final, exp.times.len().max(2))?;
            let simulated = ivp
                .solve()
                .and_then(|_| ivp.trajectory_at_times(&exp.times));
            accumulate_residuals(&mut out, exp, theta, simulated)?;
        }
        Ok(DVector::from_vec(out))
    }

    pub fn calibrate(&self) -> Result<CalibrationOutcome, KineticsError> {
        let set = self
            .experiments
            .as_ref()
            .ok_or_else(|| KineticsError::MissingData("no experiments set".to_string()))?;
        set.validate()?;
        self.config.validate()?;
        let n = set.n_points();
        let p = self.n_fit_params();
        let (lower, upper) = self.theta_bounds();

        let mut theta0 = DVector::zeros(p);
        for pair in 0..p / 2 {
            theta0[2 * pair] = self.config.initial_A.log10();
            theta0[2 * pair + 1] = self.config.initial_Ea;
        }

        let mut de_generations = 0;
        if self.config.algorithm == FitAlgorithm::Global {
            info!("global calibration: DE exploration over {} parameters", p);
            let bounds: Vec<(f64, f64)> =
                (0..p).map(|j| (lower[j], upper[j])).collect();
            let de = DifferentialEvolution::new(bounds, self.config.seed)?
                .with_population(self.config.de_population)
                .with_max_generations(self.config.de_generations);
            let de_out = de.minimize(|x| {
                let theta = DVector::from_column_slice(x);
                match self.residuals(&theta) {
                    Ok(r) => r.norm_squared(),
                    Err(_) => PENALTY_RESIDUAL * PENALTY_RESIDUAL * n as f64,
                }
            });
            de_generations = de_out.generations;
            theta0 = DVector::from_vec(de_out.x);
        }

        info!("local polish from theta = {:?}", theta0);
        let lm_out = levenberg_marquardt::minimize(
            |theta| self.residuals(theta),
            theta0,
            lower,
            upper,
            self.config.lm,
        )?;

        let params = self.params_from_theta(&lm_out.params)?;
        let (r_squared, rmse, mae) = goodness_of_fit(set, &lm_out.residuals);
        let (intervals, message) = self.confidence_intervals(&lm_out, n);
        let outcome = CalibrationOutcome {
            params,
            converged: lm_out.converged,
            algorithm: self.config.algorithm,
            r_squared,
            rmse,
            mae,
            intervals,
            iterations: de_generations + lm_out.iterations,
            n_points: n,
            message,
        };
        info!(
            "calibration done: R^2 = {:.4}, RMSE = {:.3} %, converged = {}",
            outcome.r_squared, outcome.rmse, outcome.converged
        );
        Ok(outcome)
    }

    fn confidence_intervals(
        &self,
        lm_out: &levenberg_marquardt::LmOutcome,
        n: usize,
    ) -> (Vec<ConfidenceInterval>, String) {
        let p = lm_out.params.len();
        if n <= p {
            return (
                Vec::new(),
                format!("{} points for {} parameters: no confidence intervals", n, p),
            );
        }
        let dof = (n - p) as f64;
        let s2 = lm_out.cost / dof;
        let jtj = lm_out.jacobian.transpose() * &lm_out.jacobian;
        let Some(cov) = jtj.try_inverse() else {
            return (
                Vec::new(),
                "singular J^T J: confidence intervals unavailable".to_string(),
            );
        };
        let t = student_t_quantile((1.0 + self.config.confidence_level) / 2.0, dof);

        let mut intervals = Vec::with_capacity(p);
        for pair in 0..p / 2 {
            let tag = if pair == 0 { "" } else { "_r" };
            let ja = 2 * pair;
            let je = 2 * pair + 1;
            let ha = t * (s2 * cov[(ja, ja)].max(0.0)).sqrt();
            let he = t * (s2 * cov[(je, je)].max(0.0)).sqrt();
            // the A interval is asymmetric: it is symmetric in log10 space
            intervals.push(ConfidenceInterval {
                name: format!("A{} [L/(mol*min)]", tag),
                value: 10f64.powf(lm_out.params[ja]),
                lower: 10f64.powf(lm_out.params[ja] - ha),
                upper: 10f64.powf(lm_out.params[ja] + ha),
            });
            intervals.push(ConfidenceInterval {
                name: format!("Ea{} [kJ/mol]", tag),
                value: lm_out.params[je],
                lower: lm_out.params[je] - he,
                upper: lm_out.params[je] + he,
            });
        }
        (intervals, String::new())
    }
}

/// Appends one experiment's residuals. A failed integration fills the
/// experiment's slots with `PENALTY_RESIDUAL`; any other error aborts.
fn accumulate_residuals(
    out: &mut Vec<f64>,
    exp: &Experiment,
    theta: &DVector<f64>,
    simulated: Result<Trajectory, KineticsError>,
) -> Result<(), KineticsError> {
    match simulated {
        Ok(traj) => {
            for (sim, obs) in traj.conversion.iter().zip(&exp.conversions) {
                out.push(sim - obs);
            }
            Ok(())
        }
        Err(KineticsError::IntegrationFailure(msg)) => {
            warn!(
                "integration failed for experiment {} at theta = {:?}: {}",
                exp.id, theta, msg
            );
            out.extend(std::iter::repeat(PENALTY_RESIDUAL).take(exp.n_points()));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn goodness_of_fit(set: &ExperimentSet, residuals: &DVector<f64>) -> (f64, f64, f64) {
    let observed: Vec<f64> = set
        .experiments
        .iter()
        .flat_map(|e| e.conversions.iter().copied())
        .collect();
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res = residuals.norm_squared();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
    let rmse = (ss_res / n).sqrt();
    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;
    (r_squared, rmse, mae)
}

/// Inverse standard normal CDF (Acklam's rational approximation,
/// |relative error| < 1.15e-9 on (0, 1)).
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Student-t quantile via the Cornish-Fisher expansion around the normal
/// quantile. Accurate to a few 1e-4 for dof >= 5, which covers the
/// calibration use (dof = n - p with n >= 7 points).
fn student_t_quantile(p: f64, dof: f64) -> f64 {
    let z = inverse_normal_cdf(p);
    let z3 = z.powi(3);
    let z5 = z.powi(5);
    let z7 = z.powi(7);
    z + (z3 + z) / (4.0 * dof)
        + (5.0 * z5 + 16.0 * z3 + 3.0 * z) / (96.0 * dof.powi(2))
        + (3.0 * z7 + 19.0 * z5 + 17.0 * z3 - 15.0 * z) / (384.0 * dof.powi(3))
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Calibration::experiment_data::{Experiment, ideal_one_step_conversion};
    use crate::Kinetics::arrhenius::ArrheniusRateLaw;
    use approx::assert_relative_eq;

    fn synthetic_set(a: f64, ea: f64, temps: &[f64]) -> ExperimentSet {
        let law = ArrheniusRateLaw { A: a, Ea: ea };
        let times: Vec<f64> = vec![0.0, 15.0, 30.0, 45.0, 60.0, 90.0, 120.0];
        let experiments = temps
            .iter()
            .map(|&temp| {
                let k = law.k_at(temp).unwrap();
                Experiment {
                    id: format!("synthetic_{}C", temp),
                    temperature: temp,
                    c_tg0: 0.5,
                    molar_ratio: 6.0,
                    times: times.clone(),
                    conversions: times
                        .iter()
                        .map(|&t| ideal_one_step_conversion(k, 0.5, 6.0, t))
                        .collect(),
                }
            })
            .collect();
        ExperimentSet::new(experiments).unwrap()
    }

    #[test]
    fn test_local_fit_recovers_synthetic_parameters() {
        let mut cal = ParameterCalibrator::new();
        cal.set_experiments(synthetic_set(8.0e5, 50.0, &[60.0, 70.0]));
        let outcome = cal.calibrate().unwrap();
        assert!(outcome.converged);
        let KineticParameters::OneStep(step) = outcome.params else {
            panic!("expected a 1-step parameter set");
        };
        assert_relative_eq!(step.forward.A, 8.0e5, max_relative = 2e-3);
        assert_relative_eq!(step.forward.Ea, 50.0, max_relative = 1e-3);
        assert!(outcome.r_squared > 0.9999);
    }

    #[test]
    fn test_reference_dataset_fit_quality() {
        let mut cal = ParameterCalibrator::new();
        cal.set_experiments(ExperimentSet::kouzu_reference());
        let outcome = cal.calibrate().unwrap();
        assert!(outcome.converged);
        assert!(outcome.r_squared > 0.98, "R^2 = {}", outcome.r_squared);
        assert!(outcome.rmse < 5.0, "RMSE = {}", outcome.rmse);
        assert!(outcome.mae <= outcome.rmse);
        let KineticParameters::OneStep(step) = outcome.params else {
            panic!("expected a 1-step parameter set");
        };
        assert_relative_eq!(step.forward.A, 8.0e5, max_relative = 0.05);
        assert_relative_eq!(step.forward.Ea, 50.0, max_relative = 0.02);

        assert_eq!(outcome.intervals.len(), 2);
        for ci in &outcome.intervals {
            assert!(ci.lower < ci.value && ci.value < ci.upper, "{:?}", ci);
        }
        assert_eq!(outcome.n_points, 28);
    }

    #[test]
    fn test_global_fit_recovers_parameters() {
        let mut cal = ParameterCalibrator::new();
        cal.set_experiments(synthetic_set(8.0e5, 50.0, &[65.0]));
        cal.set_config(FitConfig {
            algorithm: FitAlgorithm::Global,
            de_population: 12,
            de_generations: 15,
            ..Default::default()
        })
        .unwrap();
        let outcome = cal.calibrate().unwrap();
        assert!(outcome.converged);
        let KineticParameters::OneStep(step) = outcome.params else {
            panic!("expected a 1-step parameter set");
        };
        // a single temperature fixes k(T); the LM polish pins (A, Ea) along
        // the compensation line to the true pair started near it
        let k_fit = step.forward.k_at(65.0).unwrap();
        let k_true = ArrheniusRateLaw { A: 8.0e5, Ea: 50.0 }.k_at(65.0).unwrap();
        assert_relative_eq!(k_fit, k_true, max_relative = 1e-2);
    }

    #[test]
    fn test_calibrate_without_experiments_is_missing_data() {
        let cal = ParameterCalibrator::new();
        assert!(matches!(
            cal.calibrate(),
            Err(KineticsError::MissingData(_))
        ));
    }

    #[test]
    fn test_bad_config_rejected() {
        let mut cal = ParameterCalibrator::new();
        let bad = FitConfig {
            bounds_A: (1.0e15, 1.0e5),
            ..Default::default()
        };
        assert!(cal.set_config(bad).is_err());
        let bad = FitConfig {
            confidence_level: 1.5,
            ..Default::default()
        };
        assert!(cal.set_config(bad).is_err());
    }

    #[test]
    fn test_capped_iterations_report_not_converged() {
        let mut cal = ParameterCalibrator::new();
        cal.set_experiments(ExperimentSet::kouzu_reference());
        cal.set_config(FitConfig {
            lm: LmConfig {
                max_iterations: 1,
                fd_step: 1e-4,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        let outcome = cal.calibrate().unwrap();
        assert!(!outcome.converged);
        // best-so-far parameters are still usable
        assert!(matches!(outcome.params, KineticParameters::OneStep(_)));
    }

    #[test]
    fn test_failed_integration_becomes_penalty_residuals() {
        let set = synthetic_set(8.0e5, 50.0, &[60.0]);
        let exp = &set.experiments[0];
        let theta = DVector::from_vec(vec![6.0, 60.0]);

        // a stalled solver fills the experiment's slots with the penalty
        // instead of aborting the fit
        let mut out = Vec::new();
        accumulate_residuals(
            &mut out,
            exp,
            &theta,
            Err(KineticsError::IntegrationFailure("stalled".to_string())),
        )
        .unwrap();
        assert_eq!(out.len(), exp.n_points());
        assert!(out.iter().all(|&r| r == PENALTY_RESIDUAL));

        // a successful simulation appends plain deviations
        let traj = Trajectory {
            topology: ReactionTopology::OneStep,
            times: exp.times.clone(),
            concentrations: nalgebra::DMatrix::zeros(exp.n_points(), 4),
            conversion: exp.conversions.clone(),
            fame_yield: exp.conversions.clone(),
            selectivity: vec![1.0; exp.n_points()],
        };
        let mut out = Vec::new();
        accumulate_residuals(&mut out, exp, &theta, Ok(traj)).unwrap();
        assert_eq!(out.len(), exp.n_points());
        assert!(out.iter().all(|&r| r.abs() < 1e-12));

        // anything other than an integration failure still aborts
        let res = accumulate_residuals(
            &mut out,
            exp,
            &theta,
            Err(KineticsError::InvalidInput("bad feed".to_string())),
        );
        assert!(matches!(res, Err(KineticsError::InvalidInput(_))));
    }

    #[test]
    fn test_calibrate_rejects_struct_literal_bad_set() {
        // public fields allow building a set without `new`; calibrate must
        // still reject it eagerly
        let mut bad = synthetic_set(8.0e5, 50.0, &[60.0]);
        bad.experiments[0].temperature = -10.0;
        let mut cal = ParameterCalibrator::new();
        cal.set_experiments(bad);
        assert!(matches!(
            cal.calibrate(),
            Err(KineticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_student_t_quantile_values() {
        assert_relative_eq!(student_t_quantile(0.975, 1.0e9), 1.959964, epsilon = 1e-4);
        assert_relative_eq!(student_t_quantile(0.975, 26.0), 2.0555, epsilon = 2e-3);
        assert_relative_eq!(student_t_quantile(0.975, 10.0), 2.2281, epsilon = 5e-3);
        assert_relative_eq!(inverse_normal_cdf(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(inverse_normal_cdf(0.975), 1.959964, epsilon = 1e-6);
    }
}
