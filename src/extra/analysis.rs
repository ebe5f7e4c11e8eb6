use std::collections::HashSet;

use crate::abstract_plants::Genotype;
use crate::solution::BreedTree;

/// Number of generations needed to carry out a breeding tree, i.e. its height.
pub fn generations(tree: &BreedTree) -> usize {
    match tree.parents() {
        None => 0,
        Some((x, y)) => generations(x).max(generations(y)) + 1,
    }
}

/// Computes the number of distinct crossings in a breeding tree.
///
/// A cross is identified by its parents and the genotype it is kept for, so a subtree repeated
/// under both parents is counted once.
pub fn crossings(tree: &BreedTree) -> usize {
    fn aux(s: &mut HashSet<(Genotype, Genotype, Genotype)>, tree: &BreedTree) -> usize {
        match tree.parents() {
            None => 0,
            Some((x, y)) => {
                let triple = (x.genotype(), y.genotype(), tree.genotype());
                if !s.insert(triple) {
                    return 0;
                }
                1 + aux(s, x) + aux(s, y)
            }
        }
    }
    let mut s = HashSet::new();
    aux(&mut s, tree)
}
