//! Helpers around the solvers: schedule statistics and problem instances.

pub mod analysis;
pub mod instance_generators;
