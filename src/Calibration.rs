/// Experimental conversion time series: validated records, JSON loading
/// and the built-in reference dataset after Kouzu et al. (2008).
pub mod experiment_data;
/// Bounded Levenberg-Marquardt least squares with finite-difference
/// Jacobians, used as the local refinement stage of the calibration.
pub mod levenberg_marquardt;
/// Calibration of Arrhenius parameters against conversion data: local or
/// global (differential evolution + polish) fitting in (log10 A, Ea)
/// space, goodness-of-fit statistics and confidence intervals.
///
///  # Examples
/// ```rust, ignore
/// use BioTransKin::Calibration::calibrator::ParameterCalibrator;
/// use BioTransKin::Calibration::experiment_data::ExperimentSet;
/// let mut cal = ParameterCalibrator::new();
/// cal.set_experiments(ExperimentSet::kouzu_reference());
/// let outcome = cal.calibrate().unwrap();
/// outcome.print_report();
/// ```
pub mod calibrator;
