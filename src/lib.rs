#[allow(non_snake_case)]
pub mod Calibration;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Kinetics;
#[allow(non_snake_case)]
pub mod Optimization;
pub mod errors;
