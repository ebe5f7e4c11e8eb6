use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abstract_plants::Genotype;
use crate::error::{Error, Result};
use crate::plants::species::Species;

/// A breeding problem: reach `target` starting from `starts`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Instance {
    pub species: Species,
    pub starts: Vec<Genotype>,
    pub target: Genotype,
}

/// `n` genotypes of `species` drawn uniformly, repeats allowed.
pub fn random_genotypes(rng: &mut impl Rng, species: Species, n: usize) -> Vec<Genotype> {
    let all = species.genotypes();
    (0..n).map(|_| all[rng.gen_range(0..all.len())]).collect()
}

/// Starts from the seed genotypes of a random species and aims at a random genotype of it.
pub fn random_seed_instance(rng: &mut impl Rng) -> Instance {
    let species = Species::ALL[rng.gen_range(0..Species::ALL.len())];
    let genotypes = species.genotypes();
    let target = genotypes[rng.gen_range(0..genotypes.len())];
    Instance {
        species,
        starts: species.seeds(),
        target,
    }
}

/// Parses genotypes separated by whitespace or commas, checking each belongs to `species`.
pub fn parse_genotypes(species: Species, s: &str) -> Result<Vec<Genotype>> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let genotype: Genotype = w.parse()?;
            if !species.contains(genotype) {
                return Err(Error::UnknownGenotype {
                    species,
                    genotype: w.to_owned(),
                });
            }
            Ok(genotype)
        })
        .collect()
}

/// Parses a line of the form `species start start ... > target`.
pub fn parse_instance(line: &str) -> Result<Instance> {
    let (lhs, rhs) = line.split_once('>').ok_or_else(|| Error::ParseInstance {
        line: line.to_owned(),
    })?;
    let mut words = lhs.split_whitespace();
    let species: Species = words.next().unwrap_or_default().parse()?;
    let starts = parse_genotypes(species, &words.collect::<Vec<_>>().join(" "))?;
    let target = rhs.trim().parse()?;
    Ok(Instance {
        species,
        starts,
        target,
    })
}
