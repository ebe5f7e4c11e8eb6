use std::ops::{ControlFlow, Deref};

use itertools::iproduct;

use crate::abstract_plants::{Allele, Genotype, GENOTYPE_SPACE};

/// Outcomes of the Punnett square at a single locus.
///
/// A determined locus has four equally likely outcomes. An undetermined locus collapses to a
/// single [`Allele::Undetermined`] outcome, so it never changes the offspring counts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Punnett {
    alleles: [Allele; 4],
    len: usize,
}

impl Deref for Punnett {
    type Target = [Allele];

    fn deref(&self) -> &[Allele] {
        &self.alleles[..self.len]
    }
}

impl IntoIterator for Punnett {
    type Item = Allele;
    type IntoIter = std::iter::Take<std::array::IntoIter<Allele, 4>>;

    fn into_iter(self) -> Self::IntoIter {
        self.alleles.into_iter().take(self.len)
    }
}

/// Crosses two alleles at one locus.
///
/// Each allele contributes its high bit and then its low bit, giving the outcomes in the order
/// `(x.hi, y.hi)`, `(x.hi, y.lo)`, `(x.lo, y.hi)`, `(x.lo, y.lo)`.
pub fn cross_alleles(x: Allele, y: Allele) -> Punnett {
    if !x.is_determined() || !y.is_determined() {
        return Punnett {
            alleles: [Allele::Undetermined; 4],
            len: 1,
        };
    }
    let (x_hi, x_lo) = (x.bits() >> 1, x.bits() & 1);
    let (y_hi, y_lo) = (y.bits() >> 1, y.bits() & 1);
    let join = |a: u8, b: u8| Allele::from_cross_bits((a << 1) | b);
    Punnett {
        alleles: [join(x_hi, y_hi), join(x_hi, y_lo), join(x_lo, y_hi), join(x_lo, y_lo)],
        len: 4,
    }
}

/// Every offspring of `parent1 x parent2`, one item per equally likely outcome.
///
/// Locus 1 varies slowest. Duplicates are kept so that counting an item gives its
/// multiplicity.
pub fn children(parent1: Genotype, parent2: Genotype) -> impl Iterator<Item = Genotype> + Clone {
    let [x1, x2, x3, x4] = parent1.alleles();
    let [y1, y2, y3, y4] = parent2.alleles();
    iproduct!(
        cross_alleles(x1, y1),
        cross_alleles(x2, y2),
        cross_alleles(x3, y3),
        cross_alleles(x4, y4)
    )
    .map(|(a1, a2, a3, a4)| Genotype::new(a1, a2, a3, a4))
}

/// Feeds every offspring of `parent1 x parent2` to `f` until it breaks.
pub fn for_each_child<B>(
    parent1: Genotype,
    parent2: Genotype,
    f: impl FnMut(Genotype) -> ControlFlow<B>,
) -> ControlFlow<B> {
    children(parent1, parent2).try_for_each(f)
}

/// Distinct offspring of `parent1 x parent2` with their multiplicities, in first-seen order.
///
/// The counts sum to `4^n` where `n` is the number of loci determined in both parents.
pub fn cross_genotypes(parent1: Genotype, parent2: Genotype) -> Vec<(Genotype, usize)> {
    let mut counts = vec![0usize; GENOTYPE_SPACE];
    let mut order = Vec::new();
    for child in children(parent1, parent2) {
        if counts[child.index()] == 0 {
            order.push(child);
        }
        counts[child.index()] += 1;
    }
    order
        .into_iter()
        .map(|child| (child, counts[child.index()]))
        .collect()
}
