//! Batch-reactor IVP for the transesterification network.
//!
//! # Problem Description
//!
//! Isothermal batch kinetics: given a reaction topology, kinetic parameters,
//! a temperature and an initial composition, integrate
//!
//! d[C]/dt = S * r(C, T),   C(0) = C0
//!
//! over a time horizon and report concentration, conversion and FAME-yield
//! trajectories on an evenly spaced output grid. The early reaction can be
//! fast relative to the horizon, so the default solver is an implicit
//! adaptive method (Radau IIA, order 7) with tight tolerances; any solver
//! supported by `UniversalODESolver` can be substituted.
//!
//! # Usage
//!
//! ```ignore
//! let mut ivp = TransesterificationIVP::default_solver();
//! ivp.set_problem(
//!     KineticParameters::calibrated_reference(),
//!     60.0,
//!     ConcentrationState::fresh_feed(ReactionTopology::OneStep, 0.5, 6.0)?,
//!     120.0,
//!     13,
//! )?;
//! ivp.solve()?;
//! let traj = ivp.trajectory()?;
//! ```
//!
//! A solved instance is a pure function of its inputs: re-solving with the
//! same problem produces the same trajectory.

use crate::Kinetics::arrhenius::{ArrheniusRateLaw, KineticParameters};
use crate::Kinetics::reaction_network::{
    ConcentrationState, ReactionNetworkModel, ReactionTopology,
};
use crate::errors::KineticsError;
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::numerical::Radau::Radau_main::RadauOrder;
use log::info;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// Horizon used for the long-time equilibrium calculation, min.
const EQUILIBRIUM_HORIZON: f64 = 10_000.0;
/// Largest negative concentration tolerated in a solver trajectory.
const NEGATIVE_CONC_TOL: f64 = 1e-6;

/// Time series produced by one integration.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub topology: ReactionTopology,
    pub times: Vec<f64>,
    /// rows = output times, columns = species in topology order
    pub concentrations: DMatrix<f64>,
    /// (C_TG0 - C_TG)/C_TG0 * 100, within [0, 100]
    pub conversion: Vec<f64>,
    /// C_FAME/(3*C_TG0) * 100
    pub fame_yield: Vec<f64>,
    /// yield/conversion, zero where conversion is zero
    pub selectivity: Vec<f64>,
}

impl Trajectory {
    pub fn final_conversion(&self) -> f64 {
        *self.conversion.last().unwrap_or(&0.0)
    }

    pub fn final_fame_yield(&self) -> f64 {
        *self.fame_yield.last().unwrap_or(&0.0)
    }
}

/// Final composition of the long-horizon run.
#[derive(Debug, Clone)]
pub struct EquilibriumSummary {
    pub state: ConcentrationState,
    pub conversion: f64,
    pub fame_yield: f64,
    pub t_horizon: f64,
}

/// Which Arrhenius parameter of which step to perturb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KineticField {
    PreExponential,
    ActivationEnergy,
}

#[derive(Debug, Clone, Copy)]
pub struct Perturbation {
    pub step: usize,
    pub reverse: bool,
    pub field: KineticField,
}

/// Normalized local sensitivities S = (dY/Y)/(dP/P) per species and time.
#[derive(Debug, Clone)]
pub struct SensitivityResult {
    pub times: Vec<f64>,
    pub species: Vec<&'static str>,
    /// rows = times, columns = species
    pub s: DMatrix<f64>,
}

/// Staged IVP workflow: `new` -> `set_problem` -> `solve` -> accessors.
pub struct TransesterificationIVP {
    model: Option<ReactionNetworkModel>,
    initial_state: Option<ConcentrationState>,
    T: f64,
    t_final: f64,
    n_out: usize,
    solvertype: SolverType,
    solver_params: HashMap<String, SolverParam>,
    t_mesh: Option<DVector<f64>>,
    solution: Option<DMatrix<f64>>,
}

impl TransesterificationIVP {
    pub fn new(solvertype: SolverType) -> Self {
        let map_of_params = HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(1e-3)),
            ("tolerance".to_owned(), SolverParam::Float(1e-6)),
            ("max_iterations".to_owned(), SolverParam::Int(100000)),
            ("rtol".to_owned(), SolverParam::Float(1e-6)),
            ("atol".to_owned(), SolverParam::Float(1e-8)),
            ("max_step".to_owned(), SolverParam::Float(5.0)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(None)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            ("parallel".to_owned(), SolverParam::Bool(false)),
        ]);
        Self {
            model: None,
            initial_state: None,
            T: f64::NAN,
            t_final: f64::NAN,
            n_out: 0,
            solvertype,
            solver_params: map_of_params,
            t_mesh: None,
            solution: None,
        }
    }

    /// Stiff-capable default: Radau IIA of order 7.
    pub fn default_solver() -> Self {
        Self::new(SolverType::Radau(RadauOrder::Order7))
    }

    pub fn set_solver_params(&mut self, params: HashMap<String, SolverParam>) {
        for (key, value) in params {
            self.solver_params.insert(key, value);
        }
    }

    /// Defines the kinetic problem. All validation happens here, before any
    /// integration is attempted.
    pub fn set_problem(
        &mut self,
        params: KineticParameters,
        T_celsius: f64,
        initial_state: ConcentrationState,
        t_final: f64,
        n_out: usize,
    ) -> Result<(), KineticsError> {
        if T_celsius + 273.15 <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "temperature {} C is below absolute zero",
                T_celsius
            )));
        }
        if t_final <= 0.0 || !t_final.is_finite() {
            return Err(KineticsError::InvalidInput(format!(
                "t_final must be positive, got {}",
                t_final
            )));
        }
        if n_out < 2 {
            return Err(KineticsError::InvalidInput(format!(
                "output grid needs at least 2 points, got {}",
                n_out
            )));
        }
        let model = ReactionNetworkModel::new(params);
        if initial_state.topology != model.topology {
            return Err(KineticsError::InvalidInput(format!(
                "initial state topology {:?} does not match parameters {:?}",
                initial_state.topology, model.topology
            )));
        }
        if initial_state.get("TG").unwrap_or(0.0) <= 0.0 {
            return Err(KineticsError::InvalidInput(
                "initial TG concentration must be positive".to_string(),
            ));
        }
        self.model = Some(model);
        self.initial_state = Some(initial_state);
        self.T = T_celsius;
        self.t_final = t_final;
        self.n_out = n_out;
        self.t_mesh = None;
        self.solution = None;
        Ok(())
    }

    pub fn check_task(&self) -> Result<(), KineticsError> {
        if self.model.is_none() {
            return Err(KineticsError::MissingData(
                "kinetic model not set, call set_problem() first".to_string(),
            ));
        }
        if self.initial_state.is_none() {
            return Err(KineticsError::MissingData(
                "initial state not set".to_string(),
            ));
        }
        if !(self.t_final > 0.0) {
            return Err(KineticsError::MissingData(
                "t_final not set or invalid".to_string(),
            ));
        }
        if self.T.is_nan() {
            return Err(KineticsError::MissingData("temperature not set".to_string()));
        }
        Ok(())
    }

    /// Integrates the ODE system and stores the solver mesh and solution.
    pub fn solve(&mut self) -> Result<(), KineticsError> {
        self.check_task()?;
        let model = self.model.as_ref().ok_or_else(|| {
            KineticsError::MissingData("kinetic model not set".to_string())
        })?;
        let state = self.initial_state.as_ref().ok_or_else(|| {
            KineticsError::MissingData("initial state not set".to_string())
        })?;
        let (t_mesh, solution) = run_integration(
            model,
            state,
            self.T,
            self.t_final,
            &self.solvertype,
            &self.solver_params,
        )?;
        info!(
            "kinetics integrated: {} mesh points over {} min at {} C",
            t_mesh.len(),
            self.t_final,
            self.T
        );
        self.t_mesh = Some(t_mesh);
        self.solution = Some(solution);
        Ok(())
    }

    /// Evenly spaced output grid [0, t_final].
    pub fn output_times(&self) -> Vec<f64> {
        let n = self.n_out.max(2);
        let dt = self.t_final / (n - 1) as f64;
        (0..n).map(|i| i as f64 * dt).collect()
    }

    /// Concentrations interpolated onto arbitrary times within the horizon.
    pub fn solution_at_times(&self, times: &[f64]) -> Result<DMatrix<f64>, KineticsError> {
        let t_mesh = self.t_mesh.as_ref().ok_or_else(|| {
            KineticsError::MissingData("no solution, call solve() first".to_string())
        })?;
        let solution = self.solution.as_ref().ok_or_else(|| {
            KineticsError::MissingData("no solution, call solve() first".to_string())
        })?;
        Ok(interpolate_rows(t_mesh, solution, times))
    }

    /// Full trajectory with derived conversion/yield/selectivity series on
    /// the requested output grid.
    pub fn trajectory(&self) -> Result<Trajectory, KineticsError> {
        let times = self.output_times();
        self.trajectory_at_times(&times)
    }

    pub fn trajectory_at_times(&self, times: &[f64]) -> Result<Trajectory, KineticsError> {
        let model = self.model.as_ref().ok_or_else(|| {
            KineticsError::MissingData("kinetic model not set".to_string())
        })?;
        let state = self.initial_state.as_ref().ok_or_else(|| {
            KineticsError::MissingData("initial state not set".to_string())
        })?;
        let concentrations = self.solution_at_times(times)?;
        let c_tg0 = state.get("TG").unwrap_or(0.0);
        let topology = model.topology;
        let fame_idx = fame_index(topology);

        let mut conversion = Vec::with_capacity(times.len());
        let mut fame_yield = Vec::with_capacity(times.len());
        let mut selectivity = Vec::with_capacity(times.len());
        for i in 0..times.len() {
            let c_tg = concentrations[(i, 0)];
            let x = ((c_tg0 - c_tg) / c_tg0 * 100.0).clamp(0.0, 100.0);
            let y = (concentrations[(i, fame_idx)] / (3.0 * c_tg0) * 100.0).max(0.0);
            conversion.push(x);
            fame_yield.push(y);
            selectivity.push(if x > 0.0 { y / x } else { 0.0 });
        }
        Ok(Trajectory {
            topology,
            times: times.to_vec(),
            concentrations,
            conversion,
            fame_yield,
            selectivity,
        })
    }

    pub fn final_conversion(&self) -> Result<f64, KineticsError> {
        Ok(self.trajectory()?.final_conversion())
    }

    /// Long-horizon integration (t = 10 000 min) approximating the chemical
    /// equilibrium of the configured problem. Does not disturb the stored
    /// solution.
    pub fn equilibrium(&self) -> Result<EquilibriumSummary, KineticsError> {
        self.check_task()?;
        let model = self.model.as_ref().ok_or_else(|| {
            KineticsError::MissingData("kinetic model not set".to_string())
        })?;
        let state = self.initial_state.as_ref().ok_or_else(|| {
            KineticsError::MissingData("initial state not set".to_string())
        })?;
        let (t_mesh, solution) = run_integration(
            model,
            state,
            self.T,
            EQUILIBRIUM_HORIZON,
            &self.solvertype,
            &self.solver_params,
        )?;
        let final_row = interpolate_rows(&t_mesh, &solution, &[EQUILIBRIUM_HORIZON]);
        let values: Vec<f64> = (0..final_row.ncols()).map(|j| final_row[(0, j)]).collect();
        let c_tg0 = state.get("TG").unwrap_or(0.0);
        let conversion = ((c_tg0 - values[0]) / c_tg0 * 100.0).clamp(0.0, 100.0);
        let fame_yield =
            (values[fame_index(model.topology)] / (3.0 * c_tg0) * 100.0).max(0.0);
        Ok(EquilibriumSummary {
            state: ConcentrationState::new(model.topology, values)?,
            conversion,
            fame_yield,
            t_horizon: EQUILIBRIUM_HORIZON,
        })
    }

    /// Normalized local sensitivity of every species trajectory to a
    /// fractional perturbation of one Arrhenius parameter:
    /// S = ((Y_pert - Y_base)/Y_base) / fraction, with indeterminate points
    /// (zero base concentration) reported as zero.
    pub fn parameter_sensitivity(
        &self,
        perturbation: Perturbation,
        fraction: f64,
    ) -> Result<SensitivityResult, KineticsError> {
        self.check_task()?;
        if fraction == 0.0 || !fraction.is_finite() {
            return Err(KineticsError::InvalidInput(
                "perturbation fraction must be non-zero and finite".to_string(),
            ));
        }
        let model = self.model.as_ref().ok_or_else(|| {
            KineticsError::MissingData("kinetic model not set".to_string())
        })?;
        let state = self.initial_state.as_ref().ok_or_else(|| {
            KineticsError::MissingData("initial state not set".to_string())
        })?;

        let perturbed_params = perturb_params(&model.params, perturbation, fraction)?;
        let perturbed_model = ReactionNetworkModel::new(perturbed_params);

        let times = self.output_times();
        let (t_base, sol_base) = run_integration(
            model,
            state,
            self.T,
            self.t_final,
            &self.solvertype,
            &self.solver_params,
        )?;
        let (t_pert, sol_pert) = run_integration(
            &perturbed_model,
            state,
            self.T,
            self.t_final,
            &self.solvertype,
            &self.solver_params,
        )?;
        let base = interpolate_rows(&t_base, &sol_base, &times);
        let pert = interpolate_rows(&t_pert, &sol_pert, &times);

        let mut s = DMatrix::zeros(times.len(), model.topology.n_species());
        for i in 0..times.len() {
            for j in 0..model.topology.n_species() {
                let y0 = base[(i, j)];
                if y0.abs() > 1e-12 {
                    let val = ((pert[(i, j)] - y0) / y0) / fraction;
                    s[(i, j)] = if val.is_finite() { val } else { 0.0 };
                }
            }
        }
        Ok(SensitivityResult {
            times,
            species: model.topology.species_names().to_vec(),
            s,
        })
    }
}

fn fame_index(topology: ReactionTopology) -> usize {
    match topology {
        ReactionTopology::OneStep => 2,
        ReactionTopology::ThreeStep => 4,
    }
}

/// One solver run: symbolic RHS -> UniversalODESolver -> validated mesh and
/// solution matrix (rows = mesh points, columns = species).
fn run_integration(
    model: &ReactionNetworkModel,
    initial_state: &ConcentrationState,
    T_celsius: f64,
    t_final: f64,
    solvertype: &SolverType,
    solver_params: &HashMap<String, SolverParam>,
) -> Result<(DVector<f64>, DMatrix<f64>), KineticsError> {
    let (eq_system, unknowns) = model.rhs_expressions(T_celsius)?;
    let y0 = initial_state.values.clone();

    let mut ode = UniversalODESolver::new(
        eq_system,
        unknowns,
        "t".to_owned(),
        solvertype.clone(),
        0.0,
        y0,
        t_final,
    );
    ode.set_parameters(solver_params.clone());
    ode.initialize();
    ode.solve();

    let (t_mesh, solution) = ode.get_result();
    let t_mesh = t_mesh.ok_or_else(|| {
        KineticsError::IntegrationFailure("solver produced no time mesh".to_string())
    })?;
    let solution = solution.ok_or_else(|| {
        KineticsError::IntegrationFailure("solver produced no solution".to_string())
    })?;
    validate_solver_output(t_mesh, solution, t_final)
}

/// Rejects degenerate, non-finite, negative or truncated solver output.
/// A mesh that stops short of `t_final` means the adaptive stepper stalled
/// partway through the horizon; interpolation would otherwise clamp every
/// later time to the stalled composition.
fn validate_solver_output(
    t_mesh: DVector<f64>,
    solution: DMatrix<f64>,
    t_final: f64,
) -> Result<(DVector<f64>, DMatrix<f64>), KineticsError> {
    if t_mesh.len() < 2 || solution.nrows() != t_mesh.len() {
        return Err(KineticsError::IntegrationFailure(format!(
            "degenerate solver output: {} mesh points, {} solution rows",
            t_mesh.len(),
            solution.nrows()
        )));
    }
    let t_end = t_mesh[t_mesh.len() - 1];
    if t_end < t_final - 1e-6 * t_final.abs().max(1.0) {
        return Err(KineticsError::IntegrationFailure(format!(
            "solver stalled at t = {} of horizon {}",
            t_end, t_final
        )));
    }
    let mut min_c: f64 = 0.0;
    for &v in solution.iter() {
        if !v.is_finite() {
            return Err(KineticsError::IntegrationFailure(
                "non-finite concentration in solution".to_string(),
            ));
        }
        min_c = min_c.min(v);
    }
    if min_c < -NEGATIVE_CONC_TOL {
        return Err(KineticsError::IntegrationFailure(format!(
            "concentration went negative beyond tolerance: {}",
            min_c
        )));
    }
    Ok((t_mesh, solution))
}

/// Linear interpolation of the solver mesh onto requested times, clamped to
/// the mesh range and to non-negative concentrations.
fn interpolate_rows(
    t_mesh: &DVector<f64>,
    solution: &DMatrix<f64>,
    times: &[f64],
) -> DMatrix<f64> {
    let n_rows = t_mesh.len();
    let n_cols = solution.ncols();
    let mut out = DMatrix::zeros(times.len(), n_cols);
    for (i, &t) in times.iter().enumerate() {
        if t <= t_mesh[0] {
            for j in 0..n_cols {
                out[(i, j)] = solution[(0, j)].max(0.0);
            }
            continue;
        }
        if t >= t_mesh[n_rows - 1] {
            for j in 0..n_cols {
                out[(i, j)] = solution[(n_rows - 1, j)].max(0.0);
            }
            continue;
        }
        // first mesh index with t_mesh[k] >= t
        let mut k = 1;
        while k < n_rows - 1 && t_mesh[k] < t {
            k += 1;
        }
        let (t0, t1) = (t_mesh[k - 1], t_mesh[k]);
        let w = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
        for j in 0..n_cols {
            let v = solution[(k - 1, j)] * (1.0 - w) + solution[(k, j)] * w;
            out[(i, j)] = v.max(0.0);
        }
    }
    out
}

fn perturb_params(
    params: &KineticParameters,
    perturbation: Perturbation,
    fraction: f64,
) -> Result<KineticParameters, KineticsError> {
    let mut steps = params.steps();
    let step = steps.get_mut(perturbation.step).ok_or_else(|| {
        KineticsError::InvalidInput(format!(
            "step index {} out of range for {}-step parameters",
            perturbation.step,
            params.n_steps()
        ))
    })?;
    let law: &mut ArrheniusRateLaw = if perturbation.reverse {
        step.reverse.as_mut().ok_or_else(|| {
            KineticsError::InvalidInput(format!(
                "step {} has no reverse parameters",
                perturbation.step
            ))
        })?
    } else {
        &mut step.forward
    };
    match perturbation.field {
        KineticField::PreExponential => law.A *= 1.0 + fraction,
        KineticField::ActivationEnergy => law.Ea *= 1.0 + fraction,
    }
    Ok(match params {
        KineticParameters::OneStep(_) => KineticParameters::OneStep(steps[0]),
        KineticParameters::ThreeStep(_) => {
            KineticParameters::ThreeStep([steps[0], steps[1], steps[2]])
        }
    })
}
