//! Genetics of the supported flower species.

pub mod cross;
pub mod species;
