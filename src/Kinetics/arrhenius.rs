//! Arrhenius rate law and kinetic parameter records for the
//! transesterification reaction network.
//!
//! Conventions used throughout the crate:
//! - temperatures are given in °C and converted to K internally,
//! - activation energies are in kJ/mol,
//! - pre-exponential factors are in L/(mol·min) (bimolecular steps).
//!
//! Parameter sets are tagged by topology: a 1-step network carries a single
//! forward/reverse rate pair, a 3-step network carries three independent
//! pairs. Reverse parameters are optional; an absent reverse pair means the
//! step is treated as irreversible.

use crate::errors::KineticsError;
use serde::{Deserialize, Serialize};

/// Universal gas constant, J/(mol·K)
pub const R_G: f64 = 8.314;

/// k(T) = A*exp(-Ea/(R*T))
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusRateLaw {
    /// Pre-exponential factor, L/(mol·min)
    pub A: f64,
    /// Activation energy, kJ/mol
    pub Ea: f64,
}

impl ArrheniusRateLaw {
    pub fn new(A: f64, Ea: f64) -> Result<Self, KineticsError> {
        if A <= 0.0 || !A.is_finite() {
            return Err(KineticsError::InvalidInput(format!(
                "pre-exponential factor must be positive, got {}",
                A
            )));
        }
        if Ea < 0.0 || !Ea.is_finite() {
            return Err(KineticsError::InvalidInput(format!(
                "activation energy must be non-negative, got {}",
                Ea
            )));
        }
        Ok(Self { A, Ea })
    }

    /// Rate constant at the given temperature in °C.
    pub fn k_at(&self, T_celsius: f64) -> Result<f64, KineticsError> {
        let T_kelvin = T_celsius + 273.15;
        if T_kelvin <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "absolute temperature must be positive, got {} K",
                T_kelvin
            )));
        }
        let Ea_J_mol = self.Ea * 1000.0;
        Ok(self.A * (-Ea_J_mol / (R_G * T_kelvin)).exp())
    }
}

/// Forward/reverse rate pair for one reaction step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParameters {
    pub forward: ArrheniusRateLaw,
    pub reverse: Option<ArrheniusRateLaw>,
}

impl StepParameters {
    pub fn irreversible(A: f64, Ea: f64) -> Result<Self, KineticsError> {
        Ok(Self {
            forward: ArrheniusRateLaw::new(A, Ea)?,
            reverse: None,
        })
    }

    pub fn reversible(
        A_f: f64,
        Ea_f: f64,
        A_r: f64,
        Ea_r: f64,
    ) -> Result<Self, KineticsError> {
        Ok(Self {
            forward: ArrheniusRateLaw::new(A_f, Ea_f)?,
            reverse: Some(ArrheniusRateLaw::new(A_r, Ea_r)?),
        })
    }

    /// (k_forward, k_reverse) at the given temperature; k_reverse is zero
    /// for an irreversible step.
    pub fn rate_constants(&self, T_celsius: f64) -> Result<(f64, f64), KineticsError> {
        let k_f = self.forward.k_at(T_celsius)?;
        let k_r = match &self.reverse {
            Some(law) => law.k_at(T_celsius)?,
            None => 0.0,
        };
        Ok((k_f, k_r))
    }
}

/// Kinetic parameters tagged by reaction topology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KineticParameters {
    /// TG + 3 MeOH <=> 3 FAME + GL, one lumped pseudo-second-order step
    OneStep(StepParameters),
    /// TG -> DG -> MG -> GL, three sequential reversible steps
    ThreeStep([StepParameters; 3]),
}

impl KineticParameters {
    pub fn n_steps(&self) -> usize {
        match self {
            KineticParameters::OneStep(_) => 1,
            KineticParameters::ThreeStep(_) => 3,
        }
    }

    pub fn steps(&self) -> Vec<StepParameters> {
        match self {
            KineticParameters::OneStep(s) => vec![*s],
            KineticParameters::ThreeStep(s) => s.to_vec(),
        }
    }

    /// Parameters calibrated against the Kouzu et al. (2008) conversion
    /// data for CaO-catalyzed transesterification of used cooking oil.
    pub fn calibrated_reference() -> Self {
        KineticParameters::OneStep(StepParameters {
            forward: ArrheniusRateLaw { A: 8.0e5, Ea: 50.0 },
            reverse: None,
        })
    }

    /// Salinas & Guerrero-Fajardo, Fuel 2010. Pseudo-homogeneous
    /// second-order 1-step model for CaO.
    pub fn salinas_2010() -> Self {
        KineticParameters::OneStep(StepParameters {
            forward: ArrheniusRateLaw { A: 2.98e10, Ea: 51.9 },
            reverse: Some(ArrheniusRateLaw { A: 1.0e9, Ea: 45.0 }),
        })
    }

    /// Pratigto et al., JKSA 2018. 1-step model.
    pub fn pratigto_2018() -> Self {
        KineticParameters::OneStep(StepParameters {
            forward: ArrheniusRateLaw { A: 1.5e12, Ea: 79.0 },
            reverse: Some(ArrheniusRateLaw { A: 5.0e10, Ea: 60.0 }),
        })
    }

    /// Kouzu et al., Fuel 2008 (kinetic regime).
    pub fn kouzu_2008() -> Self {
        KineticParameters::OneStep(StepParameters {
            forward: ArrheniusRateLaw { A: 5.0e15, Ea: 161.0 },
            reverse: Some(ArrheniusRateLaw { A: 1.0e14, Ea: 130.0 }),
        })
    }

    /// Liu et al., Fuel 2008. Mechanistic 3-step model for CaO.
    pub fn liu_2008() -> Self {
        KineticParameters::ThreeStep([
            StepParameters {
                forward: ArrheniusRateLaw { A: 1.2e11, Ea: 65.0 },
                reverse: Some(ArrheniusRateLaw { A: 3.0e9, Ea: 55.0 }),
            },
            StepParameters {
                forward: ArrheniusRateLaw { A: 8.0e10, Ea: 62.0 },
                reverse: Some(ArrheniusRateLaw { A: 2.5e9, Ea: 53.0 }),
            },
            StepParameters {
                forward: ArrheniusRateLaw { A: 5.0e10, Ea: 58.0 },
                reverse: Some(ArrheniusRateLaw { A: 2.0e9, Ea: 50.0 }),
            },
        ])
    }

    /// Stamenkovic et al., Bioresource Tech 2008. 3-step model.
    pub fn stamenkovic_2008() -> Self {
        KineticParameters::ThreeStep([
            StepParameters {
                forward: ArrheniusRateLaw { A: 2.5e11, Ea: 70.5 },
                reverse: Some(ArrheniusRateLaw { A: 5.0e9, Ea: 60.0 }),
            },
            StepParameters {
                forward: ArrheniusRateLaw { A: 1.8e11, Ea: 68.0 },
                reverse: Some(ArrheniusRateLaw { A: 4.0e9, Ea: 58.0 }),
            },
            StepParameters {
                forward: ArrheniusRateLaw { A: 1.2e11, Ea: 65.0 },
                reverse: Some(ArrheniusRateLaw { A: 3.5e9, Ea: 55.0 }),
            },
        ])
    }
}
