use std::ops::ControlFlow;

use bit_vec::BitVec;
use itertools::iproduct;

use crate::abstract_plants::{Allele, Genotype, GENOTYPE_SPACE};
use crate::error::Result;
use crate::plants::cross::for_each_child;
use crate::plants::species::{Color, Species};
use crate::solvers::BreedOptions;

use Allele::*;

const RECESSIVE_PARENTS: [(Allele, Allele); 4] = [
    (HomRecessive, HomRecessive),
    (HomRecessive, Heterozygous),
    (Heterozygous, HomRecessive),
    (Heterozygous, Heterozygous),
];

const HETEROZYGOUS_PARENTS: [(Allele, Allele); 7] = [
    (HomRecessive, Heterozygous),
    (HomRecessive, HomDominant),
    (Heterozygous, HomRecessive),
    (Heterozygous, Heterozygous),
    (Heterozygous, HomDominant),
    (HomDominant, HomRecessive),
    (HomDominant, Heterozygous),
];

const DOMINANT_PARENTS: [(Allele, Allele); 4] = [
    (Heterozygous, Heterozygous),
    (HomDominant, Heterozygous),
    (Heterozygous, HomDominant),
    (HomDominant, HomDominant),
];

const UNDETERMINED_PARENTS: [(Allele, Allele); 1] = [(Undetermined, Undetermined)];

/// Ordered allele pairs of two parents that can pass `allele` on at one locus.
fn allele_parents(allele: Allele) -> &'static [(Allele, Allele)] {
    match allele {
        HomRecessive => &RECESSIVE_PARENTS,
        Heterozygous => &HETEROZYGOUS_PARENTS,
        HomDominant => &DOMINANT_PARENTS,
        Undetermined => &UNDETERMINED_PARENTS,
    }
}

/// Whether `parent1 x parent2` can produce two different genotypes of `color`.
///
/// Stops at the first collision.
fn has_ambiguous_color(
    species: Species,
    parent1: Genotype,
    parent2: Genotype,
    color: Color,
) -> Result<bool> {
    let mut found: Option<Genotype> = None;
    let flow = for_each_child(parent1, parent2, |child| match species.color(child) {
        Err(e) => ControlFlow::Break(Err(e)),
        Ok(c) if c != color => ControlFlow::Continue(()),
        Ok(_) => match found {
            Some(previous) if previous != child => ControlFlow::Break(Ok(())),
            _ => {
                found = Some(child);
                ControlFlow::Continue(())
            }
        },
    });
    match flow {
        ControlFlow::Continue(()) => Ok(false),
        ControlFlow::Break(Ok(())) => Ok(true),
        ControlFlow::Break(Err(e)) => Err(e),
    }
}

/// Ordered parent pairs whose cross can produce `child`.
///
/// Pairs come out with locus 1 varying slowest. With
/// [`BreedOptions::distinguish_only_by_color`] set, a pair is dropped when its offspring include
/// another genotype with the same color as `child`.
pub fn find_parent_pairs(
    species: Species,
    child: Genotype,
    options: &BreedOptions,
) -> Result<Vec<(Genotype, Genotype)>> {
    let color = species.color(child)?;
    let [a1, a2, a3, a4] = child.alleles();
    let mut pairs = Vec::new();
    for (l1, l2, l3, l4) in iproduct!(
        allele_parents(a1),
        allele_parents(a2),
        allele_parents(a3),
        allele_parents(a4)
    ) {
        let parent1 = Genotype::new(l1.0, l2.0, l3.0, l4.0);
        let parent2 = Genotype::new(l1.1, l2.1, l3.1, l4.1);
        if options.distinguish_only_by_color
            && has_ambiguous_color(species, parent1, parent2, color)?
        {
            continue;
        }
        pairs.push((parent1, parent2));
    }
    Ok(pairs)
}

/// Calls `f(parent1, parent2, count)` for every unordered pair of genotypes of `species` whose
/// offspring include a member of `goals`, where `count` is how many of the equally likely
/// outcomes land in `goals`.
///
/// With [`BreedOptions::distinguish_only_by_color`] set, a pair is skipped when an offspring
/// outside `goals` shares a color with one of the goals.
pub fn for_each_parent_pair_of_goals(
    species: Species,
    goals: &[Genotype],
    options: &BreedOptions,
    mut f: impl FnMut(Genotype, Genotype, usize) -> Result<()>,
) -> Result<()> {
    let mut goal_set = BitVec::from_elem(GENOTYPE_SPACE, false);
    let mut goal_colors = Vec::with_capacity(goals.len());
    for &goal in goals {
        goal_set.set(goal.index(), true);
        let color = species.color(goal)?;
        if !goal_colors.contains(&color) {
            goal_colors.push(color);
        }
    }

    let genotypes = species.genotypes();
    for (i, &parent1) in genotypes.iter().enumerate() {
        for &parent2 in &genotypes[i..] {
            let mut count = 0;
            let flow = for_each_child(parent1, parent2, |child| {
                if goal_set[child.index()] {
                    count += 1;
                    return ControlFlow::Continue(());
                }
                if options.distinguish_only_by_color {
                    match species.color(child) {
                        Err(e) => return ControlFlow::Break(Err(e)),
                        Ok(color) if goal_colors.contains(&color) => {
                            count = 0;
                            return ControlFlow::Break(Ok(()));
                        }
                        Ok(_) => {}
                    }
                }
                ControlFlow::Continue(())
            });
            if let ControlFlow::Break(Err(e)) = flow {
                return Err(e);
            }
            if count > 0 {
                f(parent1, parent2, count)?;
            }
        }
    }
    Ok(())
}
