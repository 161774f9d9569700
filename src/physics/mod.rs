// src/physics/mod.rs
pub mod simulation;

pub use simulation::{ScanOptions, Simulation, Spectrum, TomoParams};
