use bit_vec::BitVec;
use tracing::{debug, trace};

use crate::abstract_plants::{Genotype, GENOTYPE_SPACE};
use crate::error::Result;
use crate::plants::species::Species;
use crate::solution::BreedTree;
use crate::solvers::cost::cross_cost;
use crate::solvers::parent_pairs::find_parent_pairs;
use crate::solvers::BreedOptions;

type Costed = (f64, BreedTree);

/// Call-scoped search state for one target.
struct TreeSearch<'a> {
    species: Species,
    options: &'a BreedOptions,
    roots: BitVec,
    in_progress: BitVec,
    memo: Vec<Option<Option<Costed>>>,
}

impl<'a> TreeSearch<'a> {
    fn new(species: Species, roots: &[Genotype], options: &'a BreedOptions) -> Self {
        let mut root_set = BitVec::from_elem(GENOTYPE_SPACE, false);
        for root in roots {
            root_set.set(root.index(), true);
        }
        Self {
            species,
            options,
            roots: root_set,
            in_progress: BitVec::from_elem(GENOTYPE_SPACE, false),
            memo: vec![None; GENOTYPE_SPACE],
        }
    }

    /// Cheapest tree yielding `child`, or `None` if it cannot be bred without going through a
    /// genotype already being solved higher up.
    fn solve(&mut self, child: Genotype) -> Result<Option<Costed>> {
        let i = child.index();
        if self.roots[i] {
            return Ok(Some((0.0, BreedTree::root(child))));
        }
        if let Some(known) = &self.memo[i] {
            return Ok(known.clone());
        }
        // cycle
        if self.in_progress[i] {
            return Ok(None);
        }
        self.in_progress.set(i, true);

        let mut best: Option<Costed> = None;
        for (parent1, parent2) in find_parent_pairs(self.species, child, self.options)? {
            let Some((cost1, tree1)) = self.solve(parent1)? else {
                continue;
            };
            let Some((cost2, tree2)) = self.solve(parent2)? else {
                continue;
            };
            let cost = cost1 + cost2 + cross_cost(parent1, parent2, child)?;
            if best.as_ref().map_or(true, |(b, _)| cost < *b) {
                best = Some((cost, BreedTree::breed(child, tree1, tree2)));
            }
        }

        self.in_progress.set(i, false);
        trace!(%child, cost = ?best.as_ref().map(|(c, _)| *c), "solved");
        self.memo[i] = Some(best.clone());
        Ok(best)
    }
}

/// Finds the cheapest breeding tree for `target` starting from `roots`, with its cost.
///
/// Returns `Ok(None)` when `target` cannot be bred.
pub fn find_breed_tree_with_cost(
    species: Species,
    roots: &[Genotype],
    target: Genotype,
    options: &BreedOptions,
) -> Result<Option<(f64, BreedTree)>> {
    let out = TreeSearch::new(species, roots, options).solve(target)?;
    debug!(
        %species,
        %target,
        n_roots = roots.len(),
        cost = ?out.as_ref().map(|(c, _)| *c),
        "find_breed_tree"
    );
    Ok(out)
}

/// Finds the cheapest breeding tree for `target` starting from `roots`.
///
/// The cost of a tree is the sum of [`cross_cost`] over its crosses. Among equally cheap trees
/// the first one found is kept.
pub fn find_breed_tree(
    species: Species,
    roots: &[Genotype],
    target: Genotype,
    options: &BreedOptions,
) -> Result<Option<BreedTree>> {
    Ok(find_breed_tree_with_cost(species, roots, target, options)?.map(|(_, tree)| tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    macro_rules! g {
        ($s:expr) => {
            $s.parse::<Genotype>().unwrap()
        };
    }

    const COLOR_BLIND: BreedOptions = BreedOptions {
        distinguish_only_by_color: false,
    };

    #[test]
    fn target_among_roots_test() {
        let tree = find_breed_tree(
            Species::Tulip,
            &[g!("11-00-00")],
            g!("11-00-00"),
            &BreedOptions::default(),
        )
        .unwrap();
        assert_eq!(Some(BreedTree::root(g!("11-00-00"))), tree);
    }

    #[test]
    fn rose_single_cross_test() {
        let root = g!("00-00-00-01");
        let target = g!("00-00-00-11");
        let tree = find_breed_tree(Species::Rose, &[root], target, &COLOR_BLIND).unwrap();
        assert_eq!(
            Some(BreedTree::breed(
                target,
                BreedTree::root(root),
                BreedTree::root(root)
            )),
            tree
        );
    }

    #[test]
    fn mum_two_generations_test() {
        let roots = [g!("01-00-00"), g!("00-11-00"), g!("00-00-11")];
        let (cost, tree) = find_breed_tree_with_cost(
            Species::Mum,
            &roots,
            g!("00-11-11"),
            &BreedOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert!((cost - 1.2375).abs() < 1e-9);
        let half = || {
            BreedTree::breed(
                g!("00-01-01"),
                BreedTree::root(g!("00-00-11")),
                BreedTree::root(g!("00-11-00")),
            )
        };
        assert_eq!(BreedTree::breed(g!("00-11-11"), half(), half()), tree);
        assert!((tree.cost().unwrap() - cost).abs() < 1e-9);
    }

    #[test]
    fn equal_cost_keeps_first_pair_test() {
        let roots = [g!("00-00-11"), g!("00-11-00"), g!("01-00-00")];
        let options = BreedOptions::default();
        let pairs = find_parent_pairs(Species::Mum, g!("00-01-01"), &options).unwrap();
        let pos = |p: (Genotype, Genotype)| pairs.iter().position(|q| *q == p).unwrap();
        assert!(pos((g!("00-00-11"), g!("00-11-00"))) < pos((g!("00-11-00"), g!("00-00-11"))));

        let (cost, tree) =
            find_breed_tree_with_cost(Species::Mum, &roots, g!("00-01-01"), &options)
                .unwrap()
                .unwrap();
        let first = BreedTree::breed(
            g!("00-01-01"),
            BreedTree::root(g!("00-00-11")),
            BreedTree::root(g!("00-11-00")),
        );
        let swapped = BreedTree::breed(
            g!("00-01-01"),
            BreedTree::root(g!("00-11-00")),
            BreedTree::root(g!("00-00-11")),
        );
        assert!((cost - 0.1).abs() < 1e-9);
        assert!((swapped.cost().unwrap() - cost).abs() < 1e-9);
        assert_eq!(first, tree);

        let (cost, tree) = find_breed_tree_with_cost(
            Species::Hyacinth,
            &[g!("01-00-11"), g!("00-11-00"), g!("01-00-00")],
            g!("00-00-01"),
            &options,
        )
        .unwrap()
        .unwrap();
        assert!((cost - 0.85).abs() < 1e-9);
        assert_eq!(
            BreedTree::breed(
                g!("00-00-01"),
                BreedTree::root(g!("01-00-00")),
                BreedTree::root(g!("01-00-11")),
            ),
            tree
        );
    }

    #[test]
    fn unreachable_target_test() {
        // no cross of recessive parents ever yields a dominant allele
        let tree = find_breed_tree(
            Species::Cosmos,
            &[g!("00-00-00")],
            g!("11-00-00"),
            &COLOR_BLIND,
        )
        .unwrap();
        assert_eq!(None, tree);
    }

    #[test]
    fn filter_never_finds_cheaper_tree_test() {
        let mut rng = thread_rng();
        for species in [Species::Hyacinth, Species::Windflower, Species::Pansy] {
            let seeds = species.seeds();
            let genotypes = species.genotypes();
            for _ in 0..5 {
                let target = *genotypes.choose(&mut rng).unwrap();
                let all = find_breed_tree_with_cost(species, &seeds, target, &COLOR_BLIND)
                    .unwrap();
                let filtered =
                    find_breed_tree_with_cost(species, &seeds, target, &BreedOptions::default())
                        .unwrap();
                match (all, filtered) {
                    (None, Some(_)) => panic!("filter found a tree for {}", target),
                    (Some((a, _)), Some((f, _))) => assert!(a <= f + 1e-9),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn trees_use_only_roots_test() {
        let species = Species::Windflower;
        let seeds = species.seeds();
        for target in species.genotypes().into_iter().step_by(4) {
            if let Some((cost, tree)) =
                find_breed_tree_with_cost(species, &seeds, target, &COLOR_BLIND).unwrap()
            {
                assert_eq!(target, tree.genotype());
                assert!(tree.root_genotypes().iter().all(|r| seeds.contains(r)));
                assert!((tree.cost().unwrap() - cost).abs() < 1e-9);
            }
        }
    }
}
