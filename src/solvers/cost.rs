use crate::abstract_plants::Genotype;
use crate::error::{Error, Result};
use crate::plants::cross::children;

/// Fixed cost charged for performing any cross.
pub const CROSS_OVERHEAD: f64 = 0.1;

/// Probability that `parent1 x parent2` yields one of `targets`.
fn rate_of_any(parent1: Genotype, parent2: Genotype, targets: &[Genotype]) -> Result<f64> {
    let (hits, total) = children(parent1, parent2).fold((0usize, 0usize), |(hits, total), z| {
        (hits + usize::from(targets.contains(&z)), total + 1)
    });
    if total == 0 {
        return Err(Error::EmptyCross {
            parent1: parent1.to_string(),
            parent2: parent2.to_string(),
        });
    }
    Ok(hits as f64 / total as f64)
}

/// Probability that a single offspring of `parent1 x parent2` is `child`.
pub fn child_rate(parent1: Genotype, parent2: Genotype, child: Genotype) -> Result<f64> {
    rate_of_any(parent1, parent2, &[child])
}

/// Cost of breeding `child` from `parent1 x parent2`.
///
/// Cheaper the more likely `child` is, plus [`CROSS_OVERHEAD`].
pub fn cross_cost(parent1: Genotype, parent2: Genotype, child: Genotype) -> Result<f64> {
    Ok(1.0 - child_rate(parent1, parent2, child)? + CROSS_OVERHEAD)
}

/// Cost of a cross kept for any one of several wanted `children`.
pub fn multi_cross_cost(parent1: Genotype, parent2: Genotype, children: &[Genotype]) -> Result<f64> {
    Ok(1.0 - rate_of_any(parent1, parent2, children)? + CROSS_OVERHEAD)
}
