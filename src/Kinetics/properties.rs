//! Thermophysical properties of the transesterification system components
//! (average triglyceride, glycerides, FAME, methanol, glycerol) and simple
//! mixing rules. Correlations:
//! - density: linear in temperature, rho(T) = rho_ref - k_T*(T - T_ref)
//! - viscosity: Andrade equation, mu(T) = A*exp(B/T)

use crate::errors::KineticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    AverageTG,
    AverageDG,
    AverageMG,
    AverageFAME,
    Methanol,
    Glycerol,
}

impl Component {
    /// Molecular weight, g/mol. Averages correspond to used cooking oil.
    pub fn molecular_weight(&self) -> f64 {
        match self {
            Component::AverageTG => 880.0,
            Component::AverageDG => 620.0,
            Component::AverageMG => 360.0,
            Component::AverageFAME => 292.0,
            Component::Methanol => 32.04,
            Component::Glycerol => 92.09,
        }
    }

    /// (rho_ref at 25 C in kg/m3, thermal coefficient kg/(m3*K))
    fn density_params(&self) -> (f64, f64) {
        match self {
            Component::AverageTG => (920.0, 0.65),
            Component::AverageDG => (950.0, 0.60),
            Component::AverageMG => (970.0, 0.58),
            Component::AverageFAME => (880.0, 0.70),
            Component::Methanol => (792.0, 0.90),
            Component::Glycerol => (1261.0, 0.64),
        }
    }

    /// Andrade coefficients (A in Pa*s, B in K); None where no correlation
    /// is tabulated.
    fn viscosity_params(&self) -> Option<(f64, f64)> {
        match self {
            Component::AverageTG => Some((0.0001, 3500.0)),
            Component::AverageFAME => Some((0.00015, 2800.0)),
            Component::Methanol => Some((0.00008, 1500.0)),
            Component::Glycerol => Some((0.0002, 4200.0)),
            _ => None,
        }
    }

    /// Density at temperature in C, kg/m3, floored at a physical minimum.
    pub fn density(&self, T_celsius: f64) -> f64 {
        let (rho_ref, k_t) = self.density_params();
        (rho_ref - k_t * (T_celsius - 25.0)).max(100.0)
    }

    /// Dynamic viscosity at temperature in C, Pa*s.
    pub fn viscosity(&self, T_celsius: f64) -> Result<f64, KineticsError> {
        let (a, b) = self.viscosity_params().ok_or_else(|| {
            KineticsError::MissingData(format!(
                "no viscosity correlation for {:?}",
                self
            ))
        })?;
        Ok(a * (b / (T_celsius + 273.15)).exp())
    }
}

/// Additive-volume mixture density: 1/rho_mix = sum(w_i / rho_i).
pub fn mixture_density(
    mass_fractions: &[(Component, f64)],
    T_celsius: f64,
) -> Result<f64, KineticsError> {
    let total: f64 = mass_fractions.iter().map(|(_, w)| w).sum();
    if mass_fractions.is_empty() || (total - 1.0).abs() > 1e-6 {
        return Err(KineticsError::InvalidInput(format!(
            "mass fractions must sum to 1, got {}",
            total
        )));
    }
    let inv_rho: f64 = mass_fractions
        .iter()
        .map(|(c, w)| w / c.density(T_celsius))
        .sum();
    Ok(1.0 / inv_rho)
}

/// Logarithmic mixing rule: ln(mu_mix) = sum(x_i * ln(mu_i)).
pub fn mixture_viscosity(
    mole_fractions: &[(Component, f64)],
    T_celsius: f64,
) -> Result<f64, KineticsError> {
    let total: f64 = mole_fractions.iter().map(|(_, x)| x).sum();
    if mole_fractions.is_empty() || (total - 1.0).abs() > 1e-6 {
        return Err(KineticsError::InvalidInput(format!(
            "mole fractions must sum to 1, got {}",
            total
        )));
    }
    let mut log_mu = 0.0;
    for (c, x) in mole_fractions {
        log_mu += x * c.viscosity(T_celsius)?.ln();
    }
    Ok(log_mu.exp())
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_density_decreases_with_temperature() {
        let rho_25 = Component::AverageFAME.density(25.0);
        let rho_65 = Component::AverageFAME.density(65.0);
        assert_relative_eq!(rho_25, 880.0, max_relative = 1e-12);
        assert!(rho_65 < rho_25);
        assert_relative_eq!(rho_65, 880.0 - 0.70 * 40.0, max_relative = 1e-12);
    }

    #[test]
    fn test_viscosity_decreases_with_temperature() {
        let mu_25 = Component::AverageTG.viscosity(25.0).unwrap();
        let mu_65 = Component::AverageTG.viscosity(65.0).unwrap();
        assert!(mu_65 < mu_25);
        assert!(Component::AverageDG.viscosity(25.0).is_err());
    }

    #[test]
    fn test_mixture_rules() {
        let rho = mixture_density(
            &[(Component::AverageFAME, 0.9), (Component::Glycerol, 0.1)],
            65.0,
        )
        .unwrap();
        assert!(rho > Component::AverageFAME.density(65.0));
        assert!(rho < Component::Glycerol.density(65.0));

        let mu = mixture_viscosity(
            &[(Component::AverageFAME, 0.5), (Component::Methanol, 0.5)],
            65.0,
        )
        .unwrap();
        let mu_fame = Component::AverageFAME.viscosity(65.0).unwrap();
        let mu_meoh = Component::Methanol.viscosity(65.0).unwrap();
        assert!(mu > mu_meoh && mu < mu_fame);

        assert!(mixture_density(&[(Component::Methanol, 0.5)], 65.0).is_err());
    }
}
