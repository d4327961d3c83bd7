//! Taxonomic classification of an accession.
//!
//! Ranks are held in a `BTreeMap` keyed by [`Rank`], whose ordering is the fixed rank order
//! (most general first), so iteration always walks family -> forma.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use passport_schema::v1_0::wire;
use passport_types::NonEmptyText;

use crate::{PassportError, PassportResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Family,
    Genus,
    Species,
    Subspecies,
    Variety,
    Convarietas,
    Group,
    Forma,
}

impl Rank {
    /// All ranks, most general first.
    pub const ALL: [Rank; 8] = [
        Rank::Family,
        Rank::Genus,
        Rank::Species,
        Rank::Subspecies,
        Rank::Variety,
        Rank::Convarietas,
        Rank::Group,
        Rank::Forma,
    ];

    /// Ranks below species.
    pub const SUBTAXA: [Rank; 5] = [
        Rank::Subspecies,
        Rank::Variety,
        Rank::Convarietas,
        Rank::Group,
        Rank::Forma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
            Rank::Subspecies => "subspecies",
            Rank::Variety => "variety",
            Rank::Convarietas => "convarietas",
            Rank::Group => "group",
            Rank::Forma => "forma",
        }
    }

    /// Abbreviation written before the rank's name in a taxon string.
    pub fn particle(self) -> &'static str {
        match self {
            Rank::Family | Rank::Genus | Rank::Species => "",
            Rank::Subspecies => "subsp.",
            Rank::Variety => "var.",
            Rank::Convarietas => "convar.",
            Rank::Group => "Group",
            Rank::Forma => "f.",
        }
    }

    pub fn is_subtaxon(self) -> bool {
        Rank::SUBTAXA.contains(&self)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = PassportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|rank| rank.as_str() == s)
            .ok_or_else(|| PassportError::validation("", format!("unknown taxonomic rank '{s}'")))
    }
}

/// Name and optional author of one rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Taxon {
    pub(crate) name: String,
    pub(crate) author: Option<String>,
}

impl Taxon {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Taxonomy {
    pub(crate) ranks: BTreeMap<Rank, Taxon>,
    pub(crate) ncbi_taxon: Option<String>,
}

impl Taxonomy {
    pub fn get(&self, rank: Rank) -> Option<&Taxon> {
        self.ranks.get(&rank)
    }

    pub fn name(&self, rank: Rank) -> Option<&str> {
        self.get(rank).map(Taxon::name)
    }

    pub fn author(&self, rank: Rank) -> Option<&str> {
        self.get(rank).and_then(Taxon::author)
    }

    pub fn ncbi_taxon(&self) -> Option<&str> {
        self.ncbi_taxon.as_deref()
    }

    /// Set the name of `rank`, keeping any author already recorded for it.
    pub fn set_name(&mut self, rank: Rank, name: impl Into<String>) -> PassportResult<()> {
        let name = NonEmptyText::new(name)
            .map_err(|e| PassportError::validation("", format!("{rank}: {e}")))?
            .into_inner();
        self.ranks
            .entry(rank)
            .and_modify(|taxon| taxon.name.clone_from(&name))
            .or_insert(Taxon { name, author: None });
        Ok(())
    }

    /// Set the author of `rank`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the rank has no name yet (e.g. a species author without a
    /// species) or the author is empty.
    pub fn set_author(&mut self, rank: Rank, author: impl Into<String>) -> PassportResult<()> {
        let author = NonEmptyText::new(author)
            .map_err(|e| PassportError::validation("", format!("{rank} author: {e}")))?
            .into_inner();
        match self.ranks.get_mut(&rank) {
            Some(taxon) => {
                taxon.author = Some(author);
                Ok(())
            }
            None => Err(PassportError::validation(
                "",
                format!("{rank} author can not be set without {rank} name"),
            )),
        }
    }

    pub fn set_ncbi_taxon(&mut self, value: impl Into<String>) -> PassportResult<()> {
        let value = NonEmptyText::new(value)
            .map_err(|e| PassportError::validation("", format!("ncbiTaxon: {e}")))?;
        self.ncbi_taxon = Some(value.into_inner());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty() && self.ncbi_taxon.is_none()
    }

    /// The last populated subtaxon in rank order, i.e. the most specific one.
    pub fn lowest_subtaxon(&self) -> Option<(Rank, &Taxon)> {
        self.ranks
            .iter()
            .rev()
            .find(|(rank, _)| rank.is_subtaxon())
            .map(|(rank, taxon)| (*rank, taxon))
    }

    /// Running taxon strings, one per populated rank.
    ///
    /// From genus downwards each rank's particle and name are appended to the previous
    /// snapshot, so `genus=Medicago, species=sativa, subspecies=falcata` yields
    /// `Medicago`, `Medicago sativa`, `Medicago sativa subsp. falcata`. The family is reported
    /// on its own and is not part of the running name.
    pub fn composed_taxons(&self) -> Vec<(Rank, String)> {
        let mut composed = Vec::with_capacity(self.ranks.len());
        let mut running = String::new();

        for (rank, taxon) in &self.ranks {
            if *rank == Rank::Family {
                composed.push((*rank, taxon.name.clone()));
                continue;
            }
            for part in [rank.particle(), taxon.name.as_str()] {
                if part.is_empty() {
                    continue;
                }
                if !running.is_empty() {
                    running.push(' ');
                }
                running.push_str(part);
            }
            composed.push((*rank, running.clone()));
        }

        composed
    }

    pub(crate) fn from_wire(wire: wire::Taxonomy) -> Self {
        let mut ranks = BTreeMap::new();
        let entries = [
            (Rank::Family, wire.family),
            (Rank::Genus, wire.genus),
            (Rank::Species, wire.species),
            (Rank::Subspecies, wire.subspecies),
            (Rank::Variety, wire.variety),
            (Rank::Convarietas, wire.convarietas),
            (Rank::Group, wire.group),
            (Rank::Forma, wire.forma),
        ];
        for (rank, taxon) in entries {
            if let Some(wire::Taxon {
                name: Some(name),
                author,
            }) = taxon
            {
                ranks.insert(rank, Taxon { name, author });
            }
        }
        Self {
            ranks,
            ncbi_taxon: wire.ncbi_taxon,
        }
    }

    pub(crate) fn to_wire_if_populated(&self) -> Option<wire::Taxonomy> {
        if self.is_empty() {
            return None;
        }
        let taxon = |rank: Rank| {
            self.get(rank).map(|t| wire::Taxon {
                name: Some(t.name.clone()),
                author: t.author.clone(),
            })
        };
        Some(wire::Taxonomy {
            family: taxon(Rank::Family),
            genus: taxon(Rank::Genus),
            species: taxon(Rank::Species),
            subspecies: taxon(Rank::Subspecies),
            variety: taxon(Rank::Variety),
            convarietas: taxon(Rank::Convarietas),
            group: taxon(Rank::Group),
            forma: taxon(Rank::Forma),
            ncbi_taxon: self.ncbi_taxon.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicago() -> Taxonomy {
        let mut taxonomy = Taxonomy::default();
        taxonomy.set_name(Rank::Family, "Fabaceae").unwrap();
        taxonomy.set_name(Rank::Genus, "Medicago").unwrap();
        taxonomy.set_name(Rank::Species, "sativa").unwrap();
        taxonomy.set_author(Rank::Species, "L.").unwrap();
        taxonomy.set_name(Rank::Subspecies, "falcata").unwrap();
        taxonomy
    }

    #[test]
    fn composed_taxons_build_running_names() {
        let composed = medicago().composed_taxons();
        assert_eq!(
            composed,
            vec![
                (Rank::Family, "Fabaceae".to_string()),
                (Rank::Genus, "Medicago".to_string()),
                (Rank::Species, "Medicago sativa".to_string()),
                (Rank::Subspecies, "Medicago sativa subsp. falcata".to_string()),
            ]
        );
    }

    #[test]
    fn species_author_requires_species() {
        let mut taxonomy = Taxonomy::default();
        let err = taxonomy.set_author(Rank::Species, "L.").unwrap_err();
        assert!(err.to_string().contains("species author can not be set without species name"));
    }

    #[test]
    fn renaming_keeps_author() {
        let mut taxonomy = medicago();
        taxonomy.set_name(Rank::Species, "falcata").unwrap();
        assert_eq!(taxonomy.author(Rank::Species), Some("L."));
    }

    #[test]
    fn lowest_subtaxon_is_most_specific() {
        let mut taxonomy = medicago();
        assert_eq!(taxonomy.lowest_subtaxon().map(|(r, _)| r), Some(Rank::Subspecies));
        taxonomy.set_name(Rank::Variety, "varia").unwrap();
        assert_eq!(taxonomy.lowest_subtaxon().map(|(r, _)| r), Some(Rank::Variety));
        assert_eq!(Taxonomy::default().lowest_subtaxon(), None);
    }

    #[test]
    fn rank_parses_from_name() {
        assert_eq!("convarietas".parse::<Rank>().unwrap(), Rank::Convarietas);
        assert!("tribe".parse::<Rank>().is_err());
    }
}
