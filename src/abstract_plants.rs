use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// The gene state at one locus.
///
/// The discriminants are the two-bit patterns used inside [`Genotype`]; each bit is one
/// chromosome copy and a set bit is a copy of the trait gene.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum Allele {
    /// `00`: no copy of the trait gene
    HomRecessive = 0b00,
    /// `01`: one copy
    Heterozygous = 0b01,
    /// `11`: two copies
    HomDominant = 0b11,
    /// `??`: a locus the species does not have
    Undetermined = 0b10,
}

impl Allele {
    /// The three alleles a real locus can carry, in enumeration order.
    pub const DETERMINED: [Allele; 3] = [
        Allele::HomRecessive,
        Allele::Heterozygous,
        Allele::HomDominant,
    ];

    #[inline]
    pub(crate) fn bits(self) -> u8 {
        self as u8
    }

    /// Canonical allele for a two-bit pattern. `10` only ever comes out of a Punnett square and
    /// names the heterozygous state, so it maps to `01`.
    #[inline]
    pub(crate) fn from_cross_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Allele::HomRecessive,
            0b11 => Allele::HomDominant,
            _ => Allele::Heterozygous,
        }
    }

    #[inline]
    fn from_packed_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Allele::HomRecessive,
            0b01 => Allele::Heterozygous,
            0b11 => Allele::HomDominant,
            _ => Allele::Undetermined,
        }
    }

    pub fn is_determined(self) -> bool {
        self != Allele::Undetermined
    }

    /// Number of copies of the trait gene, `None` for an undetermined locus.
    pub fn dosage(self) -> Option<usize> {
        match self {
            Allele::HomRecessive => Some(0),
            Allele::Heterozygous => Some(1),
            Allele::HomDominant => Some(2),
            Allele::Undetermined => None,
        }
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Allele::HomRecessive => "00",
            Allele::Heterozygous => "01",
            Allele::HomDominant => "11",
            Allele::Undetermined => "??",
        };
        f.write_str(s)
    }
}

impl FromStr for Allele {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "00" => Ok(Allele::HomRecessive),
            "01" => Ok(Allele::Heterozygous),
            "11" => Ok(Allele::HomDominant),
            "??" => Ok(Allele::Undetermined),
            _ => Err(Error::ParseAllele {
                allele: s.to_owned(),
                context: s.to_owned(),
            }),
        }
    }
}

/// Number of loci a genotype can hold.
pub const MAX_LOCI: usize = 4;

/// Number of distinct packed genotype values, used to size genotype-indexed tables.
pub(crate) const GENOTYPE_SPACE: usize = 1 << (2 * MAX_LOCI);

/// A fixed sequence of four alleles packed into one byte.
///
/// Locus 1 lives in the two most significant bits. Species with three loci carry
/// [`Allele::Undetermined`] at locus 4. The packing is private: build values with
/// [`Genotype::new`] or [`Genotype::from_alleles`] and read them back with
/// [`Genotype::alleles`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Genotype(u8);

impl Genotype {
    pub fn new(a1: Allele, a2: Allele, a3: Allele, a4: Allele) -> Self {
        Self((a1.bits() << 6) | (a2.bits() << 4) | (a3.bits() << 2) | a4.bits())
    }

    pub fn from_alleles(alleles: [Allele; MAX_LOCI]) -> Self {
        let [a1, a2, a3, a4] = alleles;
        Self::new(a1, a2, a3, a4)
    }

    /// Genotype of a three locus species.
    pub fn new3(a1: Allele, a2: Allele, a3: Allele) -> Self {
        Self::new(a1, a2, a3, Allele::Undetermined)
    }

    /// Allele at `locus`, counted from 1.
    ///
    /// # Panics
    ///
    /// Panics if `locus` is not in `1..=4`.
    pub fn allele(&self, locus: usize) -> Allele {
        assert!((1..=MAX_LOCI).contains(&locus), "locus out of range");
        Allele::from_packed_bits(self.0 >> ((MAX_LOCI - locus) * 2))
    }

    pub fn alleles(&self) -> [Allele; MAX_LOCI] {
        [self.allele(1), self.allele(2), self.allele(3), self.allele(4)]
    }

    /// Number of determined loci.
    pub fn n_loci(&self) -> usize {
        self.alleles().iter().filter(|a| a.is_determined()).count()
    }

    /// Dense index for genotype-keyed tables and bitsets.
    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alleles = self.alleles();
        let shown = alleles
            .iter()
            .rposition(|a| a.is_determined())
            .map_or(0, |i| i + 1);
        for (i, a) in alleles[..shown].iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{}", a)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genotype({})", self)
    }
}

impl FromStr for Genotype {
    type Err = Error;

    /// Accepts `01-00-11`, `01-00-11-01` and the compact `010011` forms.
    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s.chars().filter(|c| *c != '-').collect();
        // allele chunks are sliced by byte offset
        if !compact.is_ascii() {
            return Err(Error::ParseAllele {
                allele: compact,
                context: s.to_owned(),
            });
        }
        if compact.len() % 2 != 0 {
            return Err(Error::ParseGenotype {
                context: s.to_owned(),
                loci: compact.len() / 2,
            });
        }
        let loci = compact.len() / 2;
        if !(3..=MAX_LOCI).contains(&loci) {
            return Err(Error::ParseGenotype {
                context: s.to_owned(),
                loci,
            });
        }
        let mut alleles = [Allele::Undetermined; MAX_LOCI];
        for (i, slot) in alleles.iter_mut().take(loci).enumerate() {
            let chunk = &compact[2 * i..2 * i + 2];
            *slot = chunk.parse().map_err(|_| Error::ParseAllele {
                allele: chunk.to_owned(),
                context: s.to_owned(),
            })?;
        }
        Ok(Genotype::from_alleles(alleles))
    }
}

impl Serialize for Genotype {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Genotype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    const ALL: [Allele; 4] = [
        Allele::HomRecessive,
        Allele::Heterozygous,
        Allele::HomDominant,
        Allele::Undetermined,
    ];

    #[test]
    fn alleles_of_new_genotype_test() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let alleles = [(); MAX_LOCI].map(|_| *ALL.choose(&mut rng).unwrap());
            let g = Genotype::from_alleles(alleles);
            assert_eq!(alleles, g.alleles());
            assert_eq!(alleles[2], g.allele(3));
        }
    }

    #[test]
    fn genotype_is_injective_test() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for a1 in ALL {
            for a2 in ALL {
                for a3 in ALL {
                    for a4 in ALL {
                        assert!(seen.insert(Genotype::new(a1, a2, a3, a4)));
                    }
                }
            }
        }
        assert_eq!(GENOTYPE_SPACE, seen.len());
    }

    #[test]
    fn display_trims_trailing_undetermined_test() {
        use Allele::*;
        assert_eq!(
            "01-00-11",
            Genotype::new3(Heterozygous, HomRecessive, HomDominant).to_string()
        );
        assert_eq!(
            "00-00-00-01",
            Genotype::new(HomRecessive, HomRecessive, HomRecessive, Heterozygous).to_string()
        );
        assert_eq!(
            "00-??-11",
            Genotype::new(HomRecessive, Undetermined, HomDominant, Undetermined).to_string()
        );
    }

    #[test]
    fn parse_genotype_test() {
        use Allele::*;
        let g = Genotype::new3(Heterozygous, HomRecessive, HomDominant);
        assert_eq!(Ok(g), "01-00-11".parse());
        assert_eq!(Ok(g), "010011".parse());
        assert_eq!(3, g.n_loci());
        assert!(matches!(
            "01-02-11".parse::<Genotype>(),
            Err(Error::ParseAllele { .. })
        ));
        assert!(matches!(
            "01-00".parse::<Genotype>(),
            Err(Error::ParseGenotype { loci: 2, .. })
        ));
    }

    #[test]
    fn parse_non_ascii_genotype_test() {
        for s in ["0\u{e9}-00-00-0", "\u{e9}\u{e9}\u{e9}", "01-00-1\u{2713}"] {
            assert!(
                matches!(s.parse::<Genotype>(), Err(Error::ParseAllele { .. })),
                "{}",
                s
            );
        }
        assert!(serde_json::from_str::<Genotype>("\"0\u{e9}-00-00-0\"").is_err());
    }

    #[test]
    fn genotype_serializes_as_text_test() {
        use Allele::*;
        let g = Genotype::new(HomDominant, Heterozygous, HomRecessive, HomDominant);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!("\"11-01-00-11\"", json);
        assert_eq!(g, serde_json::from_str::<Genotype>(&json).unwrap());
    }
}
