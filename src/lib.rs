//! Signal Simulation Library
//!
//! Simulates traffic through a single signalized intersection, driven by JSON
//! command files or directly through the library API.

pub mod simulation;
