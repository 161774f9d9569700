//! Simulates X-ray/electron diffraction and micro-tomography patterns
//! from an atomistic sample onto a virtual detector screen.
//!
//! A [`model::Sample`], [`model::Beam`] and [`model::Screen`] are built
//! independently and fed to a [`physics::Simulation`], which fills an
//! intensity stack that [`io::mrc`] writes out (optionally with a
//! radially binned spectrum).

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod physics;
pub mod utils;

pub use config::Config;
pub use error::{Result, SimError};
