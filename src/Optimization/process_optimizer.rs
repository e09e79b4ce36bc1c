//! Search for optimal transesterification operating conditions.
//!
//! # Problem Description
//! Decision variables are the reactor temperature (C), agitation speed
//! (rpm), catalyst loading (wt %) and MeOH:TG molar ratio, each confined to
//! an operating box. The objective is either plain final conversion or a
//! penalized trade-off
//!
//! J = conversion - wE*(0.6*T_norm + 0.4*rpm_norm) - wC*cat_norm
//!
//! with the penalty weights (wE, wC) scheduled by the fuzzy regime
//! configuration as a function of batch reaction time. The search runs
//! seeded differential evolution, so results are reproducible.
//!
//! Agitation and catalyst loading enter the objective only through their
//! penalty terms: the kinetic parameters are regressed at reference
//! agitation/catalyst levels where the reaction is not mass-transfer
//! limited, so the simulated conversion responds to temperature and molar
//! ratio alone. When the penalty weights are zero the optimizer therefore
//! reports an (agitation, catalyst) pair the search happened to settle on;
//! as soon as the weights switch on, both are driven to their lower
//! bounds. `bifurcation_sweep` exposes this jump as the batch time crosses
//! the short/medium fuzzy overlap.
//!
//! A candidate whose integration fails is charged a large finite cost
//! instead of aborting the search, so `optimize` does not fail for a
//! well-posed problem.

use crate::Kinetics::arrhenius::KineticParameters;
use crate::Kinetics::reaction_network::{ConcentrationState, ReactionNetworkModel};
use crate::Kinetics::transesterification_IVP::TransesterificationIVP;
use crate::Optimization::differential_evolution::DifferentialEvolution;
use crate::Optimization::fuzzy_weights::{PenaltyWeights, RegimeConfig};
use crate::errors::KineticsError;
use log::{info, warn};
use nalgebra::DMatrix;
use prettytable::{Table, row};

/// Cost of a candidate whose simulation failed.
const FAILED_SIMULATION_COST: f64 = 1.0e6;
/// Jump in optimal agitation between adjacent sweep points that is
/// classified as a bifurcation.
const AGITATION_JUMP_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingVariable {
    Temperature,
    Agitation,
    CatalystPct,
    MolarRatio,
}

impl OperatingVariable {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature [C]",
            Self::Agitation => "agitation [rpm]",
            Self::CatalystPct => "catalyst [wt %]",
            Self::MolarRatio => "MeOH:TG ratio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingBounds {
    pub temperature: (f64, f64),
    pub agitation: (f64, f64),
    pub catalyst_pct: (f64, f64),
    pub molar_ratio: (f64, f64),
}

impl OperatingBounds {
    /// Operating window of the reference CaO-catalyzed batch study.
    pub fn reference() -> Self {
        Self {
            temperature: (50.0, 65.0),
            agitation: (200.0, 800.0),
            catalyst_pct: (0.5, 2.5),
            molar_ratio: (4.0, 9.0),
        }
    }

    pub fn validate(&self) -> Result<(), KineticsError> {
        for (name, (lo, hi)) in [
            ("temperature", self.temperature),
            ("agitation", self.agitation),
            ("catalyst_pct", self.catalyst_pct),
            ("molar_ratio", self.molar_ratio),
        ] {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(KineticsError::InvalidInput(format!(
                    "{} bounds must satisfy lo < hi, got ({}, {})",
                    name, lo, hi
                )));
            }
        }
        if self.catalyst_pct.0 < 0.0 || self.agitation.0 < 0.0 || self.molar_ratio.0 <= 0.0 {
            return Err(KineticsError::InvalidInput(
                "agitation, catalyst and molar ratio bounds must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get(&self, var: OperatingVariable) -> (f64, f64) {
        match var {
            OperatingVariable::Temperature => self.temperature,
            OperatingVariable::Agitation => self.agitation,
            OperatingVariable::CatalystPct => self.catalyst_pct,
            OperatingVariable::MolarRatio => self.molar_ratio,
        }
    }

    /// Box in decision-vector order [T, rpm, cat, ratio].
    fn as_vec(&self) -> Vec<(f64, f64)> {
        vec![
            self.temperature,
            self.agitation,
            self.catalyst_pct,
            self.molar_ratio,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveMode {
    Conversion,
    MultiObjective,
}

#[derive(Debug, Clone)]
pub struct OptimalCondition {
    pub temperature: f64,
    pub agitation: f64,
    pub catalyst_pct: f64,
    pub molar_ratio: f64,
    /// final TG conversion at the optimum, %
    pub conversion: f64,
    /// penalized objective value (equals conversion when weights are zero)
    pub objective: f64,
    pub weights: PenaltyWeights,
    pub mode: ObjectiveMode,
    pub converged: bool,
    pub generations: usize,
    pub n_evaluations: usize,
}

impl OptimalCondition {
    pub fn report_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["variable", "optimum"]);
        table.add_row(row!["temperature [C]", format!("{:.2}", self.temperature)]);
        table.add_row(row!["agitation [rpm]", format!("{:.0}", self.agitation)]);
        table.add_row(row!["catalyst [wt %]", format!("{:.2}", self.catalyst_pct)]);
        table.add_row(row!["MeOH:TG ratio", format!("{:.2}", self.molar_ratio)]);
        table.add_row(row!["conversion [%]", format!("{:.2}", self.conversion)]);
        table.add_row(row!["objective", format!("{:.3}", self.objective)]);
        table.add_row(row![
            "weights (wE, wC)",
            format!("({:.4}, {:.4})", self.weights.energy, self.weights.catalyst)
        ]);
        table.add_row(row!["converged", self.converged]);
        table
    }

    pub fn print_report(&self) {
        self.report_table().printstd();
    }
}

#[derive(Debug, Clone)]
pub struct ResponseSurface {
    pub var1: OperatingVariable,
    pub var2: OperatingVariable,
    pub axis1: Vec<f64>,
    pub axis2: Vec<f64>,
    /// conversion (%), rows follow axis1, columns axis2; failed cells NaN
    pub conversion: DMatrix<f64>,
    /// FAME yield (%), same layout
    pub fame_yield: DMatrix<f64>,
}

#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub t_reaction: f64,
    pub weights: PenaltyWeights,
    pub condition: OptimalCondition,
}

#[derive(Debug, Clone, Copy)]
pub struct BifurcationJump {
    pub t_before: f64,
    pub t_after: f64,
    pub delta_agitation: f64,
}

#[derive(Debug, Clone)]
pub struct BifurcationSweep {
    pub points: Vec<SweepPoint>,
    pub jump: Option<BifurcationJump>,
}

#[derive(Debug, Clone)]
pub struct ProcessOptimizer {
    params: KineticParameters,
    c_tg0: f64,
    bounds: OperatingBounds,
    reaction_time: f64,
    mode: ObjectiveMode,
    regimes: RegimeConfig,
    pop_size: usize,
    max_generations: usize,
    seed: u64,
}

impl ProcessOptimizer {
    pub fn new(params: KineticParameters) -> Self {
        Self {
            params,
            c_tg0: 0.5,
            bounds: OperatingBounds::reference(),
            reaction_time: 90.0,
            mode: ObjectiveMode::Conversion,
            regimes: RegimeConfig::reference(),
            pop_size: 30,
            max_generations: 40,
            seed: 42,
        }
    }

    pub fn set_bounds(&mut self, bounds: OperatingBounds) -> Result<(), KineticsError> {
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    pub fn set_reaction_time(&mut self, t_minutes: f64) -> Result<(), KineticsError> {
        if !t_minutes.is_finite() || t_minutes <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "reaction time must be positive, got {}",
                t_minutes
            )));
        }
        self.reaction_time = t_minutes;
        Ok(())
    }

    pub fn set_initial_tg(&mut self, c_tg0: f64) -> Result<(), KineticsError> {
        if !c_tg0.is_finite() || c_tg0 <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "initial TG concentration must be positive, got {}",
                c_tg0
            )));
        }
        self.c_tg0 = c_tg0;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ObjectiveMode) {
        self.mode = mode;
    }

    pub fn set_regimes(&mut self, regimes: RegimeConfig) {
        self.regimes = regimes;
    }

    pub fn set_search_budget(&mut self, pop_size: usize, max_generations: usize) {
        self.pop_size = pop_size.max(4);
        self.max_generations = max_generations;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn check_task(&self) -> Result<(), KineticsError> {
        self.bounds.validate()?;
        if !(self.reaction_time > 0.0) {
            return Err(KineticsError::MissingData(
                "reaction time not set".to_string(),
            ));
        }
        Ok(())
    }

    fn scheduled_weights(&self) -> Result<PenaltyWeights, KineticsError> {
        match self.mode {
            ObjectiveMode::Conversion => Ok(PenaltyWeights {
                energy: 0.0,
                catalyst: 0.0,
            }),
            ObjectiveMode::MultiObjective => self.regimes.weights_at(self.reaction_time),
        }
    }

    /// Final conversion and FAME yield (%) of one batch.
    fn simulate(&self, temperature: f64, molar_ratio: f64) -> Result<(f64, f64), KineticsError> {
        let topology = ReactionNetworkModel::new(self.params).topology;
        let feed = ConcentrationState::fresh_feed(topology, self.c_tg0, molar_ratio)?;
        let mut ivp = TransesterificationIVP::default_solver();
        ivp.set_problem(self.params, temperature, feed, self.reaction_time, 2)?;
        ivp.solve()?;
        let traj = ivp.trajectory()?;
        Ok((traj.final_conversion(), traj.final_fame_yield()))
    }

    /// DE cost of one candidate: negated penalized objective, or a large
    /// finite cost when the batch simulation failed so the search moves on
    /// instead of aborting.
    fn penalized_cost(
        &self,
        x: &[f64],
        weights: PenaltyWeights,
        simulated: Result<(f64, f64), KineticsError>,
    ) -> f64 {
        match simulated {
            Ok((conversion, _)) => {
                let (t_lo, t_hi) = self.bounds.temperature;
                let (a_lo, a_hi) = self.bounds.agitation;
                let (c_lo, c_hi) = self.bounds.catalyst_pct;
                let t_norm = (x[0] - t_lo) / (t_hi - t_lo);
                let a_norm = (x[1] - a_lo) / (a_hi - a_lo);
                let c_norm = (x[2] - c_lo) / (c_hi - c_lo);
                -(conversion
                    - weights.energy * (0.6 * t_norm + 0.4 * a_norm)
                    - weights.catalyst * c_norm)
            }
            Err(e) => {
                warn!("candidate ({:.2} C, ratio {:.2}) failed: {}", x[0], x[3], e);
                FAILED_SIMULATION_COST
            }
        }
    }

    pub fn optimize(&self) -> Result<OptimalCondition, KineticsError> {
        self.check_task()?;
        let weights = self.scheduled_weights()?;
        info!(
            "process optimization: mode = {:?}, t = {} min, weights = ({:.4}, {:.4})",
            self.mode, self.reaction_time, weights.energy, weights.catalyst
        );

        let de = DifferentialEvolution::new(self.bounds.as_vec(), self.seed)?
            .with_population(self.pop_size)
            .with_max_generations(self.max_generations);
        let out =
            de.minimize(|x| self.penalized_cost(x, weights, self.simulate(x[0], x[3])));

        let conversion = match self.simulate(out.x[0], out.x[3]) {
            Ok((conv, _)) => conv,
            Err(e) => {
                warn!("re-simulation of the optimum failed: {}", e);
                f64::NAN
            }
        };
        Ok(OptimalCondition {
            temperature: out.x[0],
            agitation: out.x[1],
            catalyst_pct: out.x[2],
            molar_ratio: out.x[3],
            conversion,
            objective: -out.cost,
            weights,
            mode: self.mode,
            converged: out.converged && conversion.is_finite(),
            generations: out.generations,
            n_evaluations: out.n_evaluations,
        })
    }

    /// Conversion and FAME yield over an inclusive 2D grid of two operating
    /// variables, the remaining ones held at the middle of their bounds.
    /// Failed grid cells are reported as NaN, not errors.
    pub fn response_surface(
        &self,
        var1: OperatingVariable,
        var2: OperatingVariable,
        n1: usize,
        n2: usize,
    ) -> Result<ResponseSurface, KineticsError> {
        self.check_task()?;
        if var1 == var2 {
            return Err(KineticsError::InvalidInput(
                "response surface needs two distinct variables".to_string(),
            ));
        }
        if n1 < 2 || n2 < 2 {
            return Err(KineticsError::InvalidInput(format!(
                "grid needs at least 2 points per axis, got {}x{}",
                n1, n2
            )));
        }
        let axis1 = linspace(self.bounds.get(var1), n1);
        let axis2 = linspace(self.bounds.get(var2), n2);
        let mid = |v: OperatingVariable| {
            let (lo, hi) = self.bounds.get(v);
            0.5 * (lo + hi)
        };
        let mut conversion = DMatrix::from_element(n1, n2, f64::NAN);
        let mut fame_yield = DMatrix::from_element(n1, n2, f64::NAN);
        for (i, &v1) in axis1.iter().enumerate() {
            for (j, &v2) in axis2.iter().enumerate() {
                let pick = |v: OperatingVariable| {
                    if v == var1 {
                        v1
                    } else if v == var2 {
                        v2
                    } else {
                        mid(v)
                    }
                };
                match self.simulate(
                    pick(OperatingVariable::Temperature),
                    pick(OperatingVariable::MolarRatio),
                ) {
                    Ok((conv, fame)) => {
                        conversion[(i, j)] = conv;
                        fame_yield[(i, j)] = fame;
                    }
                    Err(e) => warn!(
                        "response surface cell ({}, {}) failed: {}",
                        axis1[i], axis2[j], e
                    ),
                }
            }
        }
        Ok(ResponseSurface {
            var1,
            var2,
            axis1,
            axis2,
            conversion,
            fame_yield,
        })
    }

    /// Re-optimizes at each batch time and flags the first adjacent pair of
    /// sweep points whose optimal agitation jumps by more than 100 rpm.
    pub fn bifurcation_sweep(&self, times: &[f64]) -> Result<BifurcationSweep, KineticsError> {
        if times.len() < 2 {
            return Err(KineticsError::InvalidInput(
                "bifurcation sweep needs at least 2 batch times".to_string(),
            ));
        }
        let mut points = Vec::with_capacity(times.len());
        for &t in times {
            let mut opt = self.clone();
            opt.set_reaction_time(t)?;
            opt.set_mode(ObjectiveMode::MultiObjective);
            let weights = opt.scheduled_weights()?;
            let condition = opt.optimize()?;
            info!(
                "sweep t = {} min: optimum ({:.1} C, {:.0} rpm, {:.2} wt %, ratio {:.2})",
                t, condition.temperature, condition.agitation, condition.catalyst_pct,
                condition.molar_ratio
            );
            points.push(SweepPoint {
                t_reaction: t,
                weights,
                condition,
            });
        }
        let jump = points.windows(2).find_map(|w| {
            let delta = w[1].condition.agitation - w[0].condition.agitation;
            (delta.abs() > AGITATION_JUMP_THRESHOLD).then(|| BifurcationJump {
                t_before: w[0].t_reaction,
                t_after: w[1].t_reaction,
                delta_agitation: delta,
            })
        });
        Ok(BifurcationSweep { points, jump })
    }
}

fn linspace((lo, hi): (f64, f64), n: usize) -> Vec<f64> {
    let h = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + h * i as f64).collect()
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::arrhenius::KineticParameters;

    fn reference_optimizer() -> ProcessOptimizer {
        let mut opt = ProcessOptimizer::new(KineticParameters::calibrated_reference());
        opt.set_search_budget(18, 25);
        opt
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut opt = reference_optimizer();
        let bad = OperatingBounds {
            temperature: (65.0, 50.0),
            ..OperatingBounds::reference()
        };
        assert!(opt.set_bounds(bad).is_err());
        assert!(opt.set_reaction_time(-10.0).is_err());
        assert!(opt.set_initial_tg(0.0).is_err());
    }

    #[test]
    fn test_failed_candidate_gets_finite_penalty_cost() {
        let opt = ProcessOptimizer::new(KineticParameters::calibrated_reference());
        let weights = PenaltyWeights {
            energy: 0.5,
            catalyst: 0.5,
        };
        let x = [57.5, 500.0, 1.5, 6.5];
        let cost = opt.penalized_cost(
            &x,
            weights,
            Err(KineticsError::IntegrationFailure("stalled".to_string())),
        );
        assert_eq!(cost, FAILED_SIMULATION_COST);
        // a candidate that simulated always beats a failed one
        let ok_cost = opt.penalized_cost(&x, weights, Ok((95.0, 94.0)));
        assert!(ok_cost.is_finite() && ok_cost < FAILED_SIMULATION_COST);
        // with zero weights the cost is the negated conversion
        let zero = PenaltyWeights {
            energy: 0.0,
            catalyst: 0.0,
        };
        assert_eq!(opt.penalized_cost(&x, zero, Ok((95.0, 94.0))), -95.0);
    }

    #[test]
    fn test_same_seed_reproduces_the_optimum() {
        let mut opt = reference_optimizer();
        opt.set_search_budget(10, 8);
        let a = opt.optimize().unwrap();
        let b = opt.optimize().unwrap();
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.agitation, b.agitation);
        assert_eq!(a.catalyst_pct, b.catalyst_pct);
        assert_eq!(a.molar_ratio, b.molar_ratio);
        assert_eq!(a.conversion, b.conversion);
    }

    #[test]
    fn test_conversion_mode_pushes_temperature_up() {
        let mut opt = reference_optimizer();
        opt.set_reaction_time(60.0).unwrap();
        let cond = opt.optimize().unwrap();
        // conversion grows with temperature over the whole box
        assert!(cond.temperature > 62.0, "T = {}", cond.temperature);
        assert!(cond.conversion > 85.0, "conversion = {}", cond.conversion);
        assert_eq!(cond.weights.energy, 0.0);
    }

    #[test]
    fn test_penalty_weights_pin_agitation_and_catalyst() {
        let mut opt = reference_optimizer();
        opt.set_mode(ObjectiveMode::MultiObjective);

        // inside the short/medium overlap the penalties are live and both
        // free variables collapse to their lower bounds
        opt.set_reaction_time(72.0).unwrap();
        let pinned = opt.optimize().unwrap();
        assert!(pinned.weights.energy > 0.1);
        assert!(pinned.agitation < 250.0, "rpm = {}", pinned.agitation);
        assert!(pinned.catalyst_pct < 0.62, "cat = {}", pinned.catalyst_pct);

        // at 70 min the weights are exactly zero and the flat directions
        // stay wherever the search left them
        opt.set_reaction_time(70.0).unwrap();
        let free = opt.optimize().unwrap();
        assert_eq!(free.weights.energy, 0.0);
        assert!(
            free.agitation > 250.0 || free.catalyst_pct > 0.62,
            "rpm = {}, cat = {}",
            free.agitation,
            free.catalyst_pct
        );
    }

    #[test]
    fn test_bifurcation_sweep_flags_the_jump() {
        let mut opt = reference_optimizer();
        opt.set_search_budget(14, 18);
        let sweep = opt.bifurcation_sweep(&[70.0, 80.0]).unwrap();
        assert_eq!(sweep.points.len(), 2);
        assert_eq!(sweep.points[0].weights.energy, 0.0);
        assert!(sweep.points[1].weights.energy > 0.3);
        if let Some(jump) = sweep.jump {
            assert!(jump.delta_agitation.abs() > 100.0);
            assert_eq!(jump.t_before, 70.0);
        }
    }

    #[test]
    fn test_response_surface_grid() {
        let opt = reference_optimizer();
        let surface = opt
            .response_surface(
                OperatingVariable::Temperature,
                OperatingVariable::MolarRatio,
                3,
                3,
            )
            .unwrap();
        assert_eq!(surface.axis1, vec![50.0, 57.5, 65.0]);
        assert_eq!(surface.conversion.nrows(), 3);
        // hotter and richer feeds convert more
        assert!(surface.conversion[(2, 2)] > surface.conversion[(0, 0)]);
        for v in surface.conversion.iter() {
            assert!(v.is_finite());
        }
        assert!(
            opt.response_surface(
                OperatingVariable::Temperature,
                OperatingVariable::Temperature,
                3,
                3
            )
            .is_err()
        );
    }
}
