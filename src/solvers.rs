//! A submodule for the different solvers.
//!
//! The breeding solvers search backwards from a target genotype over the crosses that can produce
//! it. [`astar`] is a general best-first search that the breeding code does not depend on.

use serde::{Deserialize, Serialize};

/// Generic pooled best-first search with cooperative yielding
pub mod astar;
/// Finds the cheapest breeding tree for a single target
pub mod breed_tree;
/// Finds breeding trees yielding any of a set of goal genotypes
pub mod breed_goals;
/// Scalar cost of a cross
pub mod cost;
/// Enumerates the parents able to produce a genotype
pub mod parent_pairs;

/// Options shared by the breeding solvers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedOptions {
    /// Skip crosses whose offspring cannot be told apart from the target by color alone.
    pub distinguish_only_by_color: bool,
}

impl Default for BreedOptions {
    fn default() -> Self {
        Self {
            distinguish_only_by_color: true,
        }
    }
}
