// src/utils/mod.rs
pub mod geometry;
