use bit_vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::abstract_plants::{Genotype, GENOTYPE_SPACE};
use crate::error::{Error, Result};
use crate::solvers::cost::{cross_cost, multi_cross_cost};

/// A breeding schedule as a binary tree of crosses.
///
/// Leaves are genotypes already owned. Every inner node crosses the genotypes yielded by its two
/// subtrees and keeps one wanted offspring (`Breed`) or any of several (`BreedMulti`).
///
/// A `BreedMulti` node holds at least two children. [`BreedTree::breed_multi`] and
/// deserialization both reject fewer.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", try_from = "UncheckedTree")]
pub enum BreedTree {
    Root {
        genotype: Genotype,
    },
    Breed {
        child: Genotype,
        parents: Box<(BreedTree, BreedTree)>,
    },
    BreedMulti {
        children: Vec<Genotype>,
        parents: Box<(BreedTree, BreedTree)>,
    },
}

/// Wire form of [`BreedTree`] before the child count of `BreedMulti` is checked.
#[derive(Deserialize)]
#[serde(tag = "kind")]
enum UncheckedTree {
    Root {
        genotype: Genotype,
    },
    Breed {
        child: Genotype,
        parents: Box<(BreedTree, BreedTree)>,
    },
    BreedMulti {
        children: Vec<Genotype>,
        parents: Box<(BreedTree, BreedTree)>,
    },
}

impl TryFrom<UncheckedTree> for BreedTree {
    type Error = Error;

    fn try_from(tree: UncheckedTree) -> Result<Self> {
        match tree {
            UncheckedTree::Root { genotype } => Ok(BreedTree::Root { genotype }),
            UncheckedTree::Breed { child, parents } => Ok(BreedTree::Breed { child, parents }),
            UncheckedTree::BreedMulti { children, parents } => {
                if children.len() < 2 {
                    return Err(Error::BreedMultiChildren {
                        count: children.len(),
                    });
                }
                Ok(BreedTree::BreedMulti { children, parents })
            }
        }
    }
}

/// One cross in a flattened schedule.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Cross {
    pub parent1: Genotype,
    pub parent2: Genotype,
    /// The offspring kept from this cross, never empty.
    pub children: Vec<Genotype>,
}

impl BreedTree {
    pub fn root(genotype: Genotype) -> Self {
        BreedTree::Root { genotype }
    }

    pub fn breed(child: Genotype, parent1: BreedTree, parent2: BreedTree) -> Self {
        BreedTree::Breed {
            child,
            parents: Box::new((parent1, parent2)),
        }
    }

    /// A cross kept for any of `children`, or `None` if there are fewer than two of them.
    pub fn breed_multi(
        children: Vec<Genotype>,
        parent1: BreedTree,
        parent2: BreedTree,
    ) -> Option<Self> {
        if children.len() < 2 {
            return None;
        }
        Some(BreedTree::BreedMulti {
            children,
            parents: Box::new((parent1, parent2)),
        })
    }

    /// The genotypes this node yields.
    pub fn genotypes(&self) -> &[Genotype] {
        match self {
            BreedTree::Root { genotype } => std::slice::from_ref(genotype),
            BreedTree::Breed { child, .. } => std::slice::from_ref(child),
            BreedTree::BreedMulti { children, .. } => children,
        }
    }

    /// The genotype carried forward when this node is used as a parent. For `BreedMulti` it is
    /// the first of its children.
    pub fn genotype(&self) -> Genotype {
        self.genotypes()[0]
    }

    pub fn parents(&self) -> Option<(&BreedTree, &BreedTree)> {
        match self {
            BreedTree::Root { .. } => None,
            BreedTree::Breed { parents, .. } | BreedTree::BreedMulti { parents, .. } => {
                Some((&parents.0, &parents.1))
            }
        }
    }

    /// Sum of the costs of every cross in the tree.
    pub fn cost(&self) -> Result<f64> {
        match self {
            BreedTree::Root { .. } => Ok(0.0),
            BreedTree::Breed { child, parents } => {
                let (x, y) = parents.as_ref();
                Ok(x.cost()? + y.cost()? + cross_cost(x.genotype(), y.genotype(), *child)?)
            }
            BreedTree::BreedMulti { children, parents } => {
                let (x, y) = parents.as_ref();
                Ok(x.cost()?
                    + y.cost()?
                    + multi_cross_cost(x.genotype(), y.genotype(), children)?)
            }
        }
    }

    /// Distinct leaf genotypes, left to right.
    pub fn root_genotypes(&self) -> Vec<Genotype> {
        fn aux(tree: &BreedTree, seen: &mut BitVec, out: &mut Vec<Genotype>) {
            match tree {
                BreedTree::Root { genotype } => {
                    if !seen[genotype.index()] {
                        seen.set(genotype.index(), true);
                        out.push(*genotype);
                    }
                }
                BreedTree::Breed { parents, .. } | BreedTree::BreedMulti { parents, .. } => {
                    aux(&parents.0, seen, out);
                    aux(&parents.1, seen, out);
                }
            }
        }
        let mut seen = BitVec::from_elem(GENOTYPE_SPACE, false);
        let mut out = Vec::new();
        aux(self, &mut seen, &mut out);
        out
    }

    /// Flattens the tree into the crosses to perform, in an order where every parent is
    /// available before it is used.
    ///
    /// A subtree producing only genotypes already produced earlier contributes nothing.
    pub fn to_crosses(&self) -> Vec<Cross> {
        fn aux(tree: &BreedTree, emitted: &mut BitVec, out: &mut Vec<Cross>) {
            let Some((x, y)) = tree.parents() else {
                return;
            };
            aux(x, emitted, out);
            aux(y, emitted, out);
            let children = tree.genotypes();
            if children.iter().all(|z| emitted[z.index()]) {
                return;
            }
            for z in children {
                emitted.set(z.index(), true);
            }
            out.push(Cross {
                parent1: x.genotype(),
                parent2: y.genotype(),
                children: children.to_vec(),
            });
        }
        let mut emitted = BitVec::from_elem(GENOTYPE_SPACE, false);
        let mut out = Vec::new();
        aux(self, &mut emitted, &mut out);
        out
    }
}
