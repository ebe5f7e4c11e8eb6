use bit_vec::BitVec;
use tracing::debug;

use crate::abstract_plants::{Genotype, GENOTYPE_SPACE};
use crate::error::Result;
use crate::plants::cross::children;
use crate::plants::species::Species;
use crate::solution::BreedTree;
use crate::solvers::breed_tree::find_breed_tree;
use crate::solvers::parent_pairs::for_each_parent_pair_of_goals;
use crate::solvers::BreedOptions;

/// Finds one breeding tree per parent pair that can yield any of `goals`, cheapest first.
///
/// Each parent is bred from `starts` with [`find_breed_tree`]; pairs with an unbreedable parent
/// or with a parent that is itself a goal are left out. A final cross yielding several goals
/// becomes a [`BreedTree::BreedMulti`] listing them in the order they first appear.
///
/// `options` also governs the parent subtrees, so with
/// [`BreedOptions::distinguish_only_by_color`] set every cross in every tree is filtered.
pub fn find_breed_trees_of_goals(
    species: Species,
    starts: &[Genotype],
    goals: &[Genotype],
    options: &BreedOptions,
) -> Result<Vec<BreedTree>> {
    let mut goal_set = BitVec::from_elem(GENOTYPE_SPACE, false);
    for goal in goals {
        goal_set.set(goal.index(), true);
    }

    let mut trees = Vec::new();
    for_each_parent_pair_of_goals(species, goals, options, |parent1, parent2, _| {
        if goal_set[parent1.index()] || goal_set[parent2.index()] {
            return Ok(());
        }
        let Some(tree1) = find_breed_tree(species, starts, parent1, options)? else {
            return Ok(());
        };
        let Some(tree2) = find_breed_tree(species, starts, parent2, options)? else {
            return Ok(());
        };

        let mut found: Vec<Genotype> = Vec::new();
        for child in children(parent1, parent2) {
            if goal_set[child.index()] && !found.contains(&child) {
                found.push(child);
            }
        }
        match found.len() {
            0 => {}
            1 => trees.push(BreedTree::breed(found[0], tree1, tree2)),
            _ => trees.extend(BreedTree::breed_multi(found, tree1, tree2)),
        }
        Ok(())
    })?;

    let mut costed = trees
        .into_iter()
        .map(|tree| Ok((tree.cost()?, tree)))
        .collect::<Result<Vec<_>>>()?;
    costed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    debug!(%species, n_goals = goals.len(), n_trees = costed.len(), "find_breed_trees_of_goals");
    Ok(costed.into_iter().map(|(_, tree)| tree).collect())
}
