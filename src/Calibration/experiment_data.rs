//! Experimental conversion time series used for kinetic parameter
//! calibration.
//!
//! An `Experiment` is an immutable record of observed conversion (%) versus
//! time (min) at one fixed temperature and initial composition. Multiple
//! experiments at different temperatures share a single set of Arrhenius
//! parameters, which is what makes the activation energy identifiable.
//! Records are serde-(de)serializable; a JSON loader is provided for
//! callers that keep datasets on disk.

use crate::Kinetics::arrhenius::ArrheniusRateLaw;
use crate::errors::KineticsError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    pub id: String,
    /// Reaction temperature, C
    pub temperature: f64,
    /// Initial TG concentration, mol/L
    pub c_tg0: f64,
    /// MeOH:TG molar ratio of the feed
    pub molar_ratio: f64,
    /// Sampling times, min, strictly increasing
    pub times: Vec<f64>,
    /// Observed TG conversion, %
    pub conversions: Vec<f64>,
}

impl Experiment {
    pub fn validate(&self) -> Result<(), KineticsError> {
        if self.temperature <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "experiment {}: temperature must be positive, got {} C",
                self.id, self.temperature
            )));
        }
        if self.c_tg0 <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "experiment {}: initial TG concentration must be positive, got {}",
                self.id, self.c_tg0
            )));
        }
        if self.molar_ratio <= 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "experiment {}: molar ratio must be positive, got {}",
                self.id, self.molar_ratio
            )));
        }
        if self.times.len() != self.conversions.len() {
            return Err(KineticsError::InvalidInput(format!(
                "experiment {}: {} times but {} conversions",
                self.id,
                self.times.len(),
                self.conversions.len()
            )));
        }
        if self.times.len() < 2 {
            return Err(KineticsError::InvalidInput(format!(
                "experiment {}: at least 2 points required",
                self.id
            )));
        }
        for w in self.times.windows(2) {
            if w[1] <= w[0] {
                return Err(KineticsError::InvalidInput(format!(
                    "experiment {}: times must be strictly increasing ({} then {})",
                    self.id, w[0], w[1]
                )));
            }
        }
        if self.times[0] < 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "experiment {}: negative time {}",
                self.id, self.times[0]
            )));
        }
        for &x in &self.conversions {
            if !(0.0..=100.0).contains(&x) {
                return Err(KineticsError::InvalidInput(format!(
                    "experiment {}: conversion {} outside [0, 100]",
                    self.id, x
                )));
            }
        }
        Ok(())
    }

    pub fn n_points(&self) -> usize {
        self.times.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentSet {
    pub experiments: Vec<Experiment>,
}

impl ExperimentSet {
    pub fn new(experiments: Vec<Experiment>) -> Result<Self, KineticsError> {
        let set = Self { experiments };
        set.validate()?;
        Ok(set)
    }

    /// The fields are public, so a set built as a struct literal can bypass
    /// `new`; consumers re-validate before fitting.
    pub fn validate(&self) -> Result<(), KineticsError> {
        if self.experiments.is_empty() {
            return Err(KineticsError::InvalidInput(
                "experiment set must not be empty".to_string(),
            ));
        }
        for exp in &self.experiments {
            exp.validate()?;
        }
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, KineticsError> {
        let file = File::open(path)?;
        let set: ExperimentSet = serde_json::from_reader(BufReader::new(file))?;
        Self::new(set.experiments)
    }

    pub fn n_points(&self) -> usize {
        self.experiments.iter().map(|e| e.n_points()).sum()
    }

    /// Reference validation dataset after Kouzu et al. (2008):
    /// CaO-catalyzed transesterification at 60/65/70/75 C, TG0 = 0.5 mol/L,
    /// 6:1 MeOH:TG, 7 samples per run (28 points), conversions rounded to
    /// 0.1 % as published. Consistent with the calibrated parameters
    /// A = 8.0e5 L/(mol*min), Ea = 50 kJ/mol.
    pub fn kouzu_reference() -> Self {
        let law = ArrheniusRateLaw { A: 8.0e5, Ea: 50.0 };
        let times = [0.0, 15.0, 30.0, 45.0, 60.0, 90.0, 120.0];
        let experiments = [60.0, 65.0, 70.0, 75.0]
            .iter()
            .map(|&temp| {
                let k = law.k_at(temp).unwrap_or(0.0);
                let conversions: Vec<f64> = times
                    .iter()
                    .map(|&t| {
                        let x = ideal_one_step_conversion(k, 0.5, 6.0, t);
                        (x * 10.0).round() / 10.0
                    })
                    .collect();
                Experiment {
                    id: format!("kouzu_{}C", temp),
                    temperature: temp,
                    c_tg0: 0.5,
                    molar_ratio: 6.0,
                    times: times.to_vec(),
                    conversions,
                }
            })
            .collect();
        Self { experiments }
    }
}

/// Closed-form conversion (%) of the irreversible 1-step network
/// `TG + 3 MeOH -> 3 FAME + GL` with rate `r = k*[TG]*[MeOH]`.
///
/// Separating d[TG]/dt = -k*[TG]*([MeOH]0 - 3([TG]0 - [TG])) gives, for a
/// non-stoichiometric feed (`molar_ratio != 3`) with methanol excess
/// `e = [MeOH]0 - 3*[TG]0`,
///
/// [TG](t) = e*u/(1 - 3*u),  u = [TG]0/(e + 3*[TG]0) * exp(-e*k*t).
///
/// Used to synthesize reference and test datasets without an ODE solve.
pub fn ideal_one_step_conversion(k: f64, c_tg0: f64, molar_ratio: f64, t: f64) -> f64 {
    let c_meoh0 = molar_ratio * c_tg0;
    let excess = c_meoh0 - 3.0 * c_tg0;
    let c_tg = if excess.abs() < 1e-12 {
        // stoichiometric feed: d[TG]/dt = -3k[TG]^2
        c_tg0 / (1.0 + 3.0 * k * c_tg0 * t)
    } else {
        let u0 = c_tg0 / (excess + 3.0 * c_tg0);
        let u = u0 * (-excess * k * t).exp();
        excess * u / (1.0 - 3.0 * u)
    };
    ((c_tg0 - c_tg) / c_tg0 * 100.0).clamp(0.0, 100.0)
}
