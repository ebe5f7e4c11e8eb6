//! Breeding planner for Mendelian flower genetics.
//!
//! Genotypes, species tables and Punnett-square crosses live in [`abstract_plants`] and
//! [`plants`]. [`solvers`] searches for cheap breeding trees and also provides a general pooled
//! best-first search. Typical use is as follows:
//! ```
//! use mendel_rs::plants::species::Species;
//! use mendel_rs::solvers::breed_tree::find_breed_tree;
//! use mendel_rs::solvers::BreedOptions;
//!
//! let species = Species::Mum;
//! let target = "00-11-11".parse().unwrap();
//! let tree = find_breed_tree(species, &species.seeds(), target, &BreedOptions::default())
//!     .unwrap()
//!     .unwrap();
//! for cross in tree.to_crosses() {
//!     println!("{} x {} -> {:?}", cross.parent1, cross.parent2, cross.children);
//! }
//! ```

/// Alleles and packed genotypes
pub mod abstract_plants;
pub mod error;
pub mod extra;
pub mod plants;
pub mod solution;
pub mod solvers;

#[cfg(feature = "python")]
mod python;

pub use abstract_plants::{Allele, Genotype};
pub use error::{Error, Result};
pub use plants::species::{Color, Species};
pub use solution::{BreedTree, Cross};
pub use solvers::BreedOptions;
