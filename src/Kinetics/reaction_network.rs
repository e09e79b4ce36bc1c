//! Reaction networks for the transesterification of triglycerides with
//! methanol over a solid base catalyst.
//!
//! Two interchangeable topologies are supported:
//! - **1-step**: `TG + 3 MeOH <=> 3 FAME + GL`, a lumped pseudo-second-order
//!   reaction with rate `r = k_f*[TG]*[MeOH] - k_r*[FAME]^3*[GL]`;
//! - **3-step**: the sequential mechanism
//!   `TG + MeOH <=> DG + FAME`, `DG + MeOH <=> MG + FAME`,
//!   `MG + MeOH <=> GL + FAME`, with the glyceride intermediates tracked
//!   explicitly.
//!
//! The model produces both a numeric derivative vector (for direct rate
//! evaluation and sensitivity work) and a symbolic right-hand side over
//! indexed concentration variables `C0..Cn` for the ODE solver.

use crate::Kinetics::arrhenius::KineticParameters;
use crate::errors::KineticsError;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

pub const ONE_STEP_SPECIES: [&str; 4] = ["TG", "MeOH", "FAME", "GL"];
pub const THREE_STEP_SPECIES: [&str; 6] = ["TG", "DG", "MG", "GL", "FAME", "MeOH"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionTopology {
    OneStep,
    ThreeStep,
}

impl ReactionTopology {
    pub fn n_species(&self) -> usize {
        match self {
            ReactionTopology::OneStep => 4,
            ReactionTopology::ThreeStep => 6,
        }
    }

    pub fn species_names(&self) -> &'static [&'static str] {
        match self {
            ReactionTopology::OneStep => &ONE_STEP_SPECIES,
            ReactionTopology::ThreeStep => &THREE_STEP_SPECIES,
        }
    }
}

/// Ordered vector of molar concentrations (mol/L) for one topology.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationState {
    pub topology: ReactionTopology,
    pub values: DVector<f64>,
}

impl ConcentrationState {
    pub fn new(topology: ReactionTopology, values: Vec<f64>) -> Result<Self, KineticsError> {
        if values.len() != topology.n_species() {
            return Err(KineticsError::InvalidInput(format!(
                "expected {} species concentrations, got {}",
                topology.n_species(),
                values.len()
            )));
        }
        for (name, &c) in topology.species_names().iter().zip(values.iter()) {
            if c < 0.0 || !c.is_finite() {
                return Err(KineticsError::InvalidInput(format!(
                    "concentration of {} must be non-negative, got {}",
                    name, c
                )));
            }
        }
        Ok(Self {
            topology,
            values: DVector::from_vec(values),
        })
    }

    /// Fresh feed: TG at `c_tg0`, methanol at `molar_ratio * c_tg0`,
    /// products and intermediates at zero.
    pub fn fresh_feed(
        topology: ReactionTopology,
        c_tg0: f64,
        molar_ratio: f64,
    ) -> Result<Self, KineticsError> {
        if c_tg0 <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "initial TG concentration must be positive, got {}",
                c_tg0
            )));
        }
        if molar_ratio <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "MeOH:TG molar ratio must be positive, got {}",
                molar_ratio
            )));
        }
        let c_meoh = molar_ratio * c_tg0;
        let values = match topology {
            // [TG, MeOH, FAME, GL]
            ReactionTopology::OneStep => vec![c_tg0, c_meoh, 0.0, 0.0],
            // [TG, DG, MG, GL, FAME, MeOH]
            ReactionTopology::ThreeStep => vec![c_tg0, 0.0, 0.0, 0.0, 0.0, c_meoh],
        };
        Self::new(topology, values)
    }

    pub fn get(&self, species: &str) -> Option<f64> {
        self.topology
            .species_names()
            .iter()
            .position(|&s| s == species)
            .map(|i| self.values[i])
    }
}

/// Rate function of one reaction network at fixed kinetic parameters.
#[derive(Debug, Clone)]
pub struct ReactionNetworkModel {
    pub topology: ReactionTopology,
    pub params: KineticParameters,
}

impl ReactionNetworkModel {
    pub fn new(params: KineticParameters) -> Self {
        let topology = match &params {
            KineticParameters::OneStep(_) => ReactionTopology::OneStep,
            KineticParameters::ThreeStep(_) => ReactionTopology::ThreeStep,
        };
        Self { topology, params }
    }

    /// Rate constants (k_f, k_r) of every step at the given temperature.
    pub fn rate_constants(&self, T_celsius: f64) -> Result<Vec<(f64, f64)>, KineticsError> {
        self.params
            .steps()
            .iter()
            .map(|s| s.rate_constants(T_celsius))
            .collect()
    }

    /// Numeric derivative vector d[C]/dt at the given state and temperature.
    ///
    /// Negative components of the state (possible transient undershoot from
    /// an adaptive solver) are clamped to zero before rate evaluation.
    pub fn rate(
        &self,
        state: &DVector<f64>,
        T_celsius: f64,
    ) -> Result<DVector<f64>, KineticsError> {
        let n = self.topology.n_species();
        if state.len() != n {
            return Err(KineticsError::InvalidInput(format!(
                "state length {} does not match topology ({} species)",
                state.len(),
                n
            )));
        }
        let c: Vec<f64> = state.iter().map(|&x| x.max(0.0)).collect();
        let k = self.rate_constants(T_celsius)?;

        let dydt = match self.topology {
            ReactionTopology::OneStep => {
                let (k_f, k_r) = k[0];
                let r = k_f * c[0] * c[1] - k_r * c[2].powi(3) * c[3];
                vec![-r, -3.0 * r, 3.0 * r, r]
            }
            ReactionTopology::ThreeStep => {
                // [TG, DG, MG, GL, FAME, MeOH]
                let r1 = k[0].0 * c[0] * c[5] - k[0].1 * c[1] * c[4];
                let r2 = k[1].0 * c[1] * c[5] - k[1].1 * c[2] * c[4];
                let r3 = k[2].0 * c[2] * c[5] - k[2].1 * c[3] * c[4];
                let total = r1 + r2 + r3;
                vec![-r1, r1 - r2, r2 - r3, r3, total, -total]
            }
        };
        Ok(DVector::from_vec(dydt))
    }

    /// Symbolic right-hand side over indexed variables `C0..Cn` with the
    /// rate constants folded in as constants at the given temperature.
    ///
    /// Returns the expression vector together with the unknown names in
    /// species order.
    pub fn rhs_expressions(
        &self,
        T_celsius: f64,
    ) -> Result<(Vec<Expr>, Vec<String>), KineticsError> {
        let n = self.topology.n_species();
        let names: Vec<String> = (0..n).map(|i| format!("C{}", i)).collect();
        let c: Vec<Expr> = names.iter().map(|s| Expr::Var(s.clone())).collect();
        let k = self.rate_constants(T_celsius)?;

        let eqs = match self.topology {
            ReactionTopology::OneStep => {
                let (k_f, k_r) = k[0];
                let fame_cubed =
                    Expr::Pow(Box::new(c[2].clone()), Box::new(Expr::Const(3.0)));
                let r = Expr::Const(k_f) * c[0].clone() * c[1].clone()
                    - Expr::Const(k_r) * fame_cubed * c[3].clone();
                vec![
                    Expr::Const(-1.0) * r.clone(),
                    Expr::Const(-3.0) * r.clone(),
                    Expr::Const(3.0) * r.clone(),
                    r,
                ]
            }
            ReactionTopology::ThreeStep => {
                let step = |kf: f64, kr: f64, reactant: &Expr, product: &Expr| {
                    Expr::Const(kf) * reactant.clone() * c[5].clone()
                        - Expr::Const(kr) * product.clone() * c[4].clone()
                };
                let r1 = step(k[0].0, k[0].1, &c[0], &c[1]);
                let r2 = step(k[1].0, k[1].1, &c[1], &c[2]);
                let r3 = step(k[2].0, k[2].1, &c[2], &c[3]);
                let total = r1.clone() + r2.clone() + r3.clone();
                vec![
                    Expr::Const(-1.0) * r1.clone(),
                    r1 - r2.clone(),
                    r2 - r3.clone(),
                    r3,
                    total.clone(),
                    Expr::Const(-1.0) * total,
                ]
            }
        };
        Ok((eqs, names))
    }
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::arrhenius::StepParameters;
    use approx::assert_relative_eq;

    fn one_step_model() -> ReactionNetworkModel {
        ReactionNetworkModel::new(KineticParameters::calibrated_reference())
    }

    #[test]
    fn test_fresh_feed_composition() {
        let state =
            ConcentrationState::fresh_feed(ReactionTopology::OneStep, 0.5, 6.0).unwrap();
        assert_eq!(state.get("TG"), Some(0.5));
        assert_eq!(state.get("MeOH"), Some(3.0));
        assert_eq!(state.get("FAME"), Some(0.0));
        assert_eq!(state.get("GL"), Some(0.0));
    }

    #[test]
    fn test_state_validation() {
        assert!(ConcentrationState::new(ReactionTopology::OneStep, vec![0.5, 3.0]).is_err());
        assert!(
            ConcentrationState::new(ReactionTopology::OneStep, vec![0.5, 3.0, -0.1, 0.0])
                .is_err()
        );
        assert!(ConcentrationState::fresh_feed(ReactionTopology::OneStep, -0.5, 6.0).is_err());
        assert!(ConcentrationState::fresh_feed(ReactionTopology::OneStep, 0.5, 0.0).is_err());
    }

    #[test]
    fn test_one_step_stoichiometry() {
        let model = one_step_model();
        let state = DVector::from_vec(vec![0.5, 3.0, 0.0, 0.0]);
        let dydt = model.rate(&state, 60.0).unwrap();
        let r = -dydt[0];
        assert!(r > 0.0);
        assert_relative_eq!(dydt[1], -3.0 * r, max_relative = 1e-12);
        assert_relative_eq!(dydt[2], 3.0 * r, max_relative = 1e-12);
        assert_relative_eq!(dydt[3], r, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_concentrations_clamped() {
        let model = one_step_model();
        // a small undershoot must behave as zero TG, not as a negative rate
        let state = DVector::from_vec(vec![-1e-9, 3.0, 1.5, 0.5]);
        let dydt = model.rate(&state, 60.0).unwrap();
        assert_eq!(dydt[0], 0.0);
    }

    #[test]
    fn test_three_step_backbone_conservation() {
        // d([TG]+[DG]+[MG]+[GL])/dt = 0 at any state
        let model = ReactionNetworkModel::new(KineticParameters::liu_2008());
        let state = DVector::from_vec(vec![0.3, 0.1, 0.05, 0.05, 0.6, 2.4]);
        let dydt = model.rate(&state, 65.0).unwrap();
        let backbone = dydt[0] + dydt[1] + dydt[2] + dydt[3];
        assert_relative_eq!(backbone, 0.0, epsilon = 1e-12);
        // FAME production balances MeOH consumption
        assert_relative_eq!(dydt[4], -dydt[5], max_relative = 1e-12);
    }

    #[test]
    fn test_reverse_term_slows_net_rate() {
        let forward_only = ReactionNetworkModel::new(KineticParameters::OneStep(
            StepParameters::irreversible(8.0e5, 50.0).unwrap(),
        ));
        let reversible = ReactionNetworkModel::new(KineticParameters::OneStep(
            StepParameters::reversible(8.0e5, 50.0, 8.0e4, 45.0).unwrap(),
        ));
        let state = DVector::from_vec(vec![0.2, 2.1, 0.9, 0.3]);
        let r_irrev = -forward_only.rate(&state, 60.0).unwrap()[0];
        let r_rev = -reversible.rate(&state, 60.0).unwrap()[0];
        assert!(r_rev < r_irrev);
    }

    #[test]
    fn test_symbolic_rhs_shape() {
        let model = one_step_model();
        let (eqs, names) = model.rhs_expressions(60.0).unwrap();
        assert_eq!(eqs.len(), 4);
        assert_eq!(names, vec!["C0", "C1", "C2", "C3"]);

        let model3 = ReactionNetworkModel::new(KineticParameters::liu_2008());
        let (eqs3, names3) = model3.rhs_expressions(65.0).unwrap();
        assert_eq!(eqs3.len(), 6);
        assert_eq!(names3.len(), 6);
    }
}
