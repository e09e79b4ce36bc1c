//! Fuzzy scheduling of penalty weights versus batch reaction time.
//!
//! Three trapezoidal membership functions partition the reaction-time axis
//! into "short", "medium" and "long" regimes; each regime carries an energy
//! and a catalyst penalty level. The scheduled weight at a time t is the
//! direct membership-weighted sum of the levels, without normalizing the
//! memberships first. In the overlap bands the memberships need not sum to
//! one, so the summed weight can briefly exceed the plateau levels; the
//! resulting weight curves are continuous and piecewise linear, and the
//! abrupt regime hand-offs of a crisp schedule are avoided.
//!
//! The reference schedule keeps both weights at exactly zero up to 70 min
//! (the "short" regime, pure conversion) and ramps them in over the
//! short/medium overlap, which is what makes optimal operating points
//! jump between an interior point and the low-energy boundary as the
//! batch time crosses that band.

use crate::errors::KineticsError;
use serde::{Deserialize, Serialize};

/// Trapezoid (a, b, c, d): 0 below a, ramp up on [a, b], plateau 1 on
/// [b, c], ramp down on [c, d], 0 above d. Degenerate edges (a == b or
/// c == d) turn the ramp into an open shoulder that stays at 1 past the
/// end of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidMF {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl TrapezoidMF {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self, KineticsError> {
        if !(a <= b && b <= c && c <= d) {
            return Err(KineticsError::InvalidInput(format!(
                "trapezoid nodes must be non-decreasing, got ({}, {}, {}, {})",
                a, b, c, d
            )));
        }
        Ok(Self { a, b, c, d })
    }

    pub fn membership(&self, t: f64) -> f64 {
        if t >= self.b && t <= self.c {
            return 1.0;
        }
        if t > self.a && t < self.b {
            return (t - self.a) / (self.b - self.a);
        }
        if t > self.c && t < self.d {
            return (self.d - t) / (self.d - self.c);
        }
        // open shoulders: a == b pins the left edge at 1, c == d the right
        if t <= self.a {
            return if self.a == self.b { 1.0 } else { 0.0 };
        }
        if self.c == self.d { 1.0 } else { 0.0 }
    }
}

/// One fuzzy regime: a membership function over reaction time plus the
/// penalty levels that apply when the batch fully belongs to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub membership: TrapezoidMF,
    pub energy_level: f64,
    pub catalyst_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    pub energy: f64,
    pub catalyst: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub regimes: Vec<Regime>,
}

impl RegimeConfig {
    pub fn new(regimes: Vec<Regime>) -> Result<Self, KineticsError> {
        if regimes.is_empty() {
            return Err(KineticsError::InvalidInput(
                "at least one fuzzy regime required".to_string(),
            ));
        }
        for r in &regimes {
            if r.energy_level < 0.0 || r.catalyst_level < 0.0 {
                return Err(KineticsError::InvalidInput(format!(
                    "penalty levels must be non-negative, got ({}, {})",
                    r.energy_level, r.catalyst_level
                )));
            }
        }
        Ok(Self { regimes })
    }

    /// Reference schedule: short batches below ~70 min run unpenalized,
    /// medium batches pay moderate energy/catalyst penalties, long batches
    /// pay the full ones.
    pub fn reference() -> Self {
        Self {
            regimes: vec![
                Regime {
                    membership: TrapezoidMF {
                        a: 60.0,
                        b: 60.0,
                        c: 70.0,
                        d: 85.0,
                    },
                    energy_level: 0.0,
                    catalyst_level: 0.0,
                },
                Regime {
                    membership: TrapezoidMF {
                        a: 70.0,
                        b: 85.0,
                        c: 100.0,
                        d: 110.0,
                    },
                    energy_level: 0.8,
                    catalyst_level: 0.3,
                },
                Regime {
                    membership: TrapezoidMF {
                        a: 95.0,
                        b: 105.0,
                        c: 120.0,
                        d: 120.0,
                    },
                    energy_level: 1.5,
                    catalyst_level: 0.6,
                },
            ],
        }
    }

    /// Direct (un-normalized) weighted sum of the regime levels at time t.
    pub fn weights_at(&self, t_minutes: f64) -> Result<PenaltyWeights, KineticsError> {
        if !t_minutes.is_finite() || t_minutes < 0.0 {
            return Err(KineticsError::InvalidInput(format!(
                "reaction time must be finite and non-negative, got {}",
                t_minutes
            )));
        }
        let mut energy = 0.0;
        let mut catalyst = 0.0;
        for r in &self.regimes {
            let mu = r.membership.membership(t_minutes);
            energy += mu * r.energy_level;
            catalyst += mu * r.catalyst_level;
        }
        Ok(PenaltyWeights { energy, catalyst })
    }
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trapezoid_shape() {
        let mf = TrapezoidMF::new(10.0, 20.0, 30.0, 40.0).unwrap();
        assert_eq!(mf.membership(5.0), 0.0);
        assert_relative_eq!(mf.membership(15.0), 0.5);
        assert_eq!(mf.membership(25.0), 1.0);
        assert_relative_eq!(mf.membership(35.0), 0.5);
        assert_eq!(mf.membership(45.0), 0.0);
        assert!(TrapezoidMF::new(10.0, 5.0, 30.0, 40.0).is_err());
    }

    #[test]
    fn test_open_shoulders() {
        let short = TrapezoidMF::new(60.0, 60.0, 70.0, 85.0).unwrap();
        assert_eq!(short.membership(0.0), 1.0);
        assert_eq!(short.membership(59.0), 1.0);
        let long = TrapezoidMF::new(95.0, 105.0, 120.0, 120.0).unwrap();
        assert_eq!(long.membership(150.0), 1.0);
        assert_eq!(long.membership(90.0), 0.0);
    }

    #[test]
    fn test_short_regime_is_unpenalized() {
        let cfg = RegimeConfig::reference();
        for t in [0.0, 30.0, 60.0, 70.0] {
            let w = cfg.weights_at(t).unwrap();
            assert_eq!(w.energy, 0.0, "t = {}", t);
            assert_eq!(w.catalyst, 0.0, "t = {}", t);
        }
    }

    #[test]
    fn test_reference_values_in_overlap_band() {
        let cfg = RegimeConfig::reference();
        // t = 72: medium membership (72-70)/15 = 2/15
        let w = cfg.weights_at(72.0).unwrap();
        assert_relative_eq!(w.energy, 0.8 * 2.0 / 15.0, max_relative = 1e-12);
        assert_relative_eq!(w.catalyst, 0.3 * 2.0 / 15.0, max_relative = 1e-12);

        // t = 92.5: medium plateau only
        let w = cfg.weights_at(92.5).unwrap();
        assert_relative_eq!(w.energy, 0.8);
        assert_relative_eq!(w.catalyst, 0.3);

        // t = 100: medium plateau edge plus half of long -> summed overlap
        let w = cfg.weights_at(100.0).unwrap();
        assert_relative_eq!(w.energy, 0.8 + 0.5 * 1.5, max_relative = 1e-12);
        assert_relative_eq!(w.catalyst, 0.3 + 0.5 * 0.6, max_relative = 1e-12);

        // t = 120: long regime only
        let w = cfg.weights_at(120.0).unwrap();
        assert_relative_eq!(w.energy, 1.5);
        assert_relative_eq!(w.catalyst, 0.6);
    }

    #[test]
    fn test_weight_curves_are_continuous() {
        let cfg = RegimeConfig::reference();
        let step = 0.25;
        let mut t = 50.0;
        let mut prev = cfg.weights_at(t).unwrap();
        while t < 130.0 {
            t += step;
            let w = cfg.weights_at(t).unwrap();
            assert!(
                (w.energy - prev.energy).abs() < 0.1,
                "energy jump at t = {}",
                t
            );
            assert!(
                (w.catalyst - prev.catalyst).abs() < 0.1,
                "catalyst jump at t = {}",
                t
            );
            prev = w;
        }
    }

    #[test]
    fn test_invalid_time_rejected() {
        let cfg = RegimeConfig::reference();
        assert!(cfg.weights_at(-1.0).is_err());
        assert!(cfg.weights_at(f64::NAN).is_err());
    }
}
