/// Seeded DE/rand/1/bin differential evolution over a box, shared by the
/// global calibration stage and the process optimizer.
pub mod differential_evolution;
/// Fuzzy scheduling of energy and catalyst penalty weights versus batch
/// reaction time (trapezoidal memberships, direct weighted sum).
pub mod fuzzy_weights;
/// Search for optimal operating conditions (temperature, agitation,
/// catalyst loading, molar ratio): pure-conversion or penalized
/// multi-objective mode, response surfaces and the bifurcation sweep over
/// batch time.
pub mod process_optimizer;
