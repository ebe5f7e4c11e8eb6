use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::abstract_plants::{Allele, Genotype, GENOTYPE_SPACE};
use crate::error::{Error, Result};

/// The visible color of a flower, the only signal a breeder observes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Yellow,
    Red,
    Pink,
    Orange,
    Purple,
    Black,
    Blue,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything the species table knows about a genotype.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Phenotype {
    pub color: Color,
    /// Whether the genotype is one of the purchasable seed stocks.
    pub seed: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Rose,
    Cosmos,
    Tulip,
    Pansy,
    Lily,
    Windflower,
    Hyacinth,
    Mum,
}

use Color::{
    Black as Bk, Blue as Bl, Green as Gn, Orange as Or, Pink as Pk, Purple as Pu, Red as Rd,
    White as Wh, Yellow as Ye,
};

/// Colors of a three locus species indexed `[r][y][first]` by gene dosage, where `first` is
/// the dosage at locus 1, `y` at locus 2 and `r` at locus 3.
type Table3 = [[[Color; 3]; 3]; 3];

/// Rose colors indexed `[r][y][w][s]`; genotype loci are ordered (w, y, r, s).
type Table4 = [[[[Color; 3]; 3]; 3]; 3];

const COSMOS: Table3 = [
    [[Wh, Wh, Wh], [Ye, Ye, Wh], [Ye, Ye, Ye]],
    [[Pk, Pk, Pk], [Or, Or, Pk], [Or, Or, Or]],
    [[Rd, Rd, Rd], [Or, Or, Rd], [Bk, Bk, Rd]],
];

const TULIP: Table3 = [
    [[Wh, Wh, Wh], [Ye, Ye, Wh], [Ye, Ye, Ye]],
    [[Rd, Pk, Wh], [Or, Ye, Ye], [Or, Ye, Ye]],
    [[Bk, Rd, Rd], [Bk, Rd, Rd], [Pu, Pu, Pu]],
];

const PANSY: Table3 = [
    [[Wh, Wh, Bl], [Ye, Ye, Bl], [Ye, Ye, Ye]],
    [[Rd, Rd, Bl], [Or, Or, Or], [Ye, Ye, Ye]],
    [[Rd, Rd, Pu], [Rd, Rd, Pu], [Or, Or, Pu]],
];

const LILY: Table3 = [
    [[Wh, Wh, Wh], [Ye, Wh, Wh], [Ye, Ye, Wh]],
    [[Rd, Pk, Wh], [Or, Ye, Ye], [Or, Ye, Ye]],
    [[Bk, Rd, Pk], [Bk, Rd, Pk], [Or, Or, Wh]],
];

const WINDFLOWER: Table3 = [
    [[Wh, Wh, Bl], [Or, Or, Bl], [Or, Or, Or]],
    [[Rd, Pk, Wh], [Or, Pk, Pk], [Or, Or, Or]],
    [[Rd, Rd, Rd], [Pk, Pk, Rd], [Pu, Pu, Pu]],
];

const HYACINTH: Table3 = [
    [[Wh, Wh, Bl], [Ye, Ye, Wh], [Ye, Ye, Ye]],
    [[Rd, Pk, Wh], [Or, Ye, Ye], [Or, Ye, Ye]],
    [[Rd, Rd, Rd], [Bl, Rd, Rd], [Pu, Pu, Pu]],
];

const MUM: Table3 = [
    [[Wh, Wh, Pu], [Ye, Ye, Wh], [Ye, Ye, Ye]],
    [[Pk, Pk, Pk], [Ye, Rd, Pk], [Pu, Pu, Pu]],
    [[Rd, Rd, Rd], [Pu, Pu, Rd], [Gn, Gn, Rd]],
];

const ROSE: Table4 = [
    [
        [[Wh, Wh, Wh], [Wh, Wh, Wh], [Pu, Pu, Pu]],
        [[Ye, Ye, Ye], [Wh, Wh, Wh], [Pu, Pu, Pu]],
        [[Ye, Ye, Ye], [Ye, Ye, Ye], [Wh, Wh, Wh]],
    ],
    [
        [[Rd, Pk, Wh], [Rd, Pk, Wh], [Rd, Pk, Pu]],
        [[Or, Ye, Ye], [Rd, Pk, Wh], [Rd, Pk, Pu]],
        [[Or, Ye, Ye], [Or, Ye, Ye], [Rd, Pk, Wh]],
    ],
    [
        [[Bk, Rd, Pk], [Bk, Rd, Pk], [Bk, Rd, Pk]],
        [[Or, Or, Ye], [Rd, Rd, Wh], [Bk, Rd, Pu]],
        [[Or, Or, Ye], [Or, Or, Ye], [Bl, Rd, Wh]],
    ],
];

/// Seed stocks as gene dosages in locus order.
const ROSE_SEEDS: [[usize; 4]; 3] = [[0, 0, 2, 1], [0, 2, 0, 0], [1, 0, 0, 0]];
const COSMOS_SEEDS: [[usize; 3]; 3] = [[0, 0, 2], [1, 2, 0], [1, 0, 0]];
const TULIP_SEEDS: [[usize; 3]; 3] = [[1, 0, 2], [0, 2, 0], [1, 0, 0]];
const PANSY_SEEDS: [[usize; 3]; 3] = [[0, 0, 2], [0, 2, 0], [1, 0, 0]];
const LILY_SEEDS: [[usize; 3]; 3] = [[1, 0, 2], [0, 2, 0], [1, 0, 0]];
const WINDFLOWER_SEEDS: [[usize; 3]; 3] = [[0, 0, 2], [0, 2, 0], [1, 0, 0]];
const HYACINTH_SEEDS: [[usize; 3]; 3] = [[1, 0, 2], [0, 2, 0], [1, 0, 0]];
const MUM_SEEDS: [[usize; 3]; 3] = [[0, 0, 2], [0, 2, 0], [1, 0, 0]];

type Lookup = [Option<Phenotype>; GENOTYPE_SPACE];

fn genotype_of_dosages(dosages: &[usize]) -> Genotype {
    let mut alleles = [Allele::Undetermined; 4];
    for (slot, &d) in alleles.iter_mut().zip(dosages) {
        *slot = Allele::DETERMINED[d];
    }
    Genotype::from_alleles(alleles)
}

fn build_table3(colors: &Table3, seeds: &[[usize; 3]]) -> Lookup {
    let mut lookup: Lookup = [None; GENOTYPE_SPACE];
    for (r, by_y) in colors.iter().enumerate() {
        for (y, by_first) in by_y.iter().enumerate() {
            for (first, &color) in by_first.iter().enumerate() {
                let dosages = [first, y, r];
                lookup[genotype_of_dosages(&dosages).index()] = Some(Phenotype {
                    color,
                    seed: seeds.contains(&dosages),
                });
            }
        }
    }
    lookup
}

fn build_table4(colors: &Table4, seeds: &[[usize; 4]]) -> Lookup {
    let mut lookup: Lookup = [None; GENOTYPE_SPACE];
    for (r, by_y) in colors.iter().enumerate() {
        for (y, by_w) in by_y.iter().enumerate() {
            for (w, by_s) in by_w.iter().enumerate() {
                for (s, &color) in by_s.iter().enumerate() {
                    let dosages = [w, y, r, s];
                    lookup[genotype_of_dosages(&dosages).index()] = Some(Phenotype {
                        color,
                        seed: seeds.contains(&dosages),
                    });
                }
            }
        }
    }
    lookup
}

fn lookups() -> &'static [Lookup; 8] {
    static LOOKUPS: OnceLock<[Lookup; 8]> = OnceLock::new();
    LOOKUPS.get_or_init(|| {
        [
            build_table4(&ROSE, &ROSE_SEEDS),
            build_table3(&COSMOS, &COSMOS_SEEDS),
            build_table3(&TULIP, &TULIP_SEEDS),
            build_table3(&PANSY, &PANSY_SEEDS),
            build_table3(&LILY, &LILY_SEEDS),
            build_table3(&WINDFLOWER, &WINDFLOWER_SEEDS),
            build_table3(&HYACINTH, &HYACINTH_SEEDS),
            build_table3(&MUM, &MUM_SEEDS),
        ]
    })
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::Rose,
        Species::Cosmos,
        Species::Tulip,
        Species::Pansy,
        Species::Lily,
        Species::Windflower,
        Species::Hyacinth,
        Species::Mum,
    ];

    fn lookup(&self) -> &'static Lookup {
        &lookups()[*self as usize]
    }

    /// Number of determined loci of the species.
    pub fn n_loci(&self) -> usize {
        match self {
            Species::Rose => 4,
            _ => 3,
        }
    }

    pub fn phenotype(&self, genotype: Genotype) -> Result<Phenotype> {
        self.lookup()[genotype.index()].ok_or_else(|| Error::UnknownGenotype {
            species: *self,
            genotype: genotype.to_string(),
        })
    }

    pub fn color(&self, genotype: Genotype) -> Result<Color> {
        self.phenotype(genotype).map(|p| p.color)
    }

    pub fn is_seed(&self, genotype: Genotype) -> Result<bool> {
        self.phenotype(genotype).map(|p| p.seed)
    }

    pub fn contains(&self, genotype: Genotype) -> bool {
        self.lookup()[genotype.index()].is_some()
    }

    /// All genotypes of the species with locus 1 varying slowest.
    pub fn genotypes(&self) -> Vec<Genotype> {
        let last: &[Allele] = if self.n_loci() == 4 {
            &Allele::DETERMINED
        } else {
            &[Allele::Undetermined]
        };
        let mut genotypes = Vec::with_capacity(81);
        for a1 in Allele::DETERMINED {
            for a2 in Allele::DETERMINED {
                for a3 in Allele::DETERMINED {
                    for &a4 in last {
                        genotypes.push(Genotype::new(a1, a2, a3, a4));
                    }
                }
            }
        }
        genotypes
    }

    /// The seed stocks of the species in enumeration order.
    pub fn seeds(&self) -> Vec<Genotype> {
        self.genotypes()
            .into_iter()
            .filter(|g| self.lookup()[g.index()].is_some_and(|p| p.seed))
            .collect()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Species::Rose => "rose",
            Species::Cosmos => "cosmos",
            Species::Tulip => "tulip",
            Species::Pansy => "pansy",
            Species::Lily => "lily",
            Species::Windflower => "windflower",
            Species::Hyacinth => "hyacinth",
            Species::Mum => "mum",
        };
        f.write_str(s)
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Species::ALL
            .into_iter()
            .find(|species| species.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::ParseSpecies { name: s.to_owned() })
    }
}
