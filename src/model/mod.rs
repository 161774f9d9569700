// src/model/mod.rs
pub mod beam;
pub mod elements;
pub mod lattice;
pub mod sample;
pub mod screen;

pub use beam::{Beam, BeamSource};
pub use lattice::CellType;
pub use sample::{Atom, Sample};
pub use screen::{Screen, ScreenShape};
