/// Worked examples: batch simulation, 3-step kinetics and sensitivities,
/// parameter calibration, process optimization, the bifurcation sweep and
/// mixture properties. Pick a task number in `main.rs`.
pub mod biodiesel_examples;
