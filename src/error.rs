//! Error types for the breeding library

use thiserror::Error;

use crate::plants::species::Species;

/// Main error type for the breeding library.
///
/// The `UnknownGenotype` and `EmptyCross` variants signal broken internal invariants: they are
/// never produced by valid inputs and callers should not try to recover from them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("internal error: genotype {genotype} has no entry in the {species} table")]
    UnknownGenotype { species: Species, genotype: String },

    #[error("internal error: crossing {parent1} x {parent2} produced no offspring")]
    EmptyCross { parent1: String, parent2: String },

    #[error("invalid allele '{allele}' in genotype '{context}' (expected 00, 01 or 11)")]
    ParseAllele { allele: String, context: String },

    #[error("invalid genotype '{context}': expected 3 or 4 loci, got {loci}")]
    ParseGenotype { context: String, loci: usize },

    #[error("unknown species '{name}'")]
    ParseSpecies { name: String },

    #[error("a multi-child cross needs at least 2 children, got {count}")]
    BreedMultiChildren { count: usize },

    #[error("invalid instance '{line}': expected 'species start... > target'")]
    ParseInstance { line: String },
}

/// Result type alias for the breeding library
pub type Result<T> = std::result::Result<T, Error>;
