use serde::{Deserialize, Serialize};
use std::fmt;

/// Taxonomic rank, ordered from broadest to most specific.
///
/// The derived `Ord` follows declaration order, so `Kingdom < Species`.
/// `Unranked` sorts after everything and never participates in hierarchy
/// depth checks; it exists so that unknown source rank strings survive
/// normalization and can be filtered at the union stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Subfamily,
    Tribe,
    Subtribe,
    Genus,
    Subgenus,
    Section,
    Subsection,
    Species,
    Subspecies,
    Variety,
    Form,
    Unranked,
}

impl Rank {
    /// The sixteen real ranks, broadest first. `Unranked` is deliberately
    /// excluded: it is a normalization artifact, not a rank.
    pub const ORDERED: [Rank; 16] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Subfamily,
        Rank::Tribe,
        Rank::Subtribe,
        Rank::Genus,
        Rank::Subgenus,
        Rank::Section,
        Rank::Subsection,
        Rank::Species,
        Rank::Subspecies,
        Rank::Variety,
        Rank::Form,
    ];

    /// Position in the fixed order, `None` for `Unranked`.
    pub fn depth(&self) -> Option<usize> {
        Rank::ORDERED.iter().position(|r| r == self)
    }

    pub fn is_infraspecific(&self) -> bool {
        matches!(self, Rank::Subspecies | Rank::Variety | Rank::Form)
    }

    /// Ranks that have a dedicated hierarchy field on every record.
    pub fn has_hierarchy_field(&self) -> bool {
        matches!(
            self,
            Rank::Kingdom
                | Rank::Phylum
                | Rank::Class
                | Rank::Order
                | Rank::Family
                | Rank::Subfamily
                | Rank::Tribe
                | Rank::Subtribe
                | Rank::Genus
                | Rank::Subgenus
                | Rank::Section
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Kingdom => "kingdom",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Subfamily => "subfamily",
            Rank::Tribe => "tribe",
            Rank::Subtribe => "subtribe",
            Rank::Genus => "genus",
            Rank::Subgenus => "subgenus",
            Rank::Section => "section",
            Rank::Subsection => "subsection",
            Rank::Species => "species",
            Rank::Subspecies => "subspecies",
            Rank::Variety => "variety",
            Rank::Form => "form",
            Rank::Unranked => "unranked",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_order_follows_declaration() {
        assert!(Rank::Kingdom < Rank::Genus);
        assert!(Rank::Species < Rank::Subspecies);
        assert!(Rank::Form < Rank::Unranked);
    }

    #[test]
    fn depth_matches_ordered_list() {
        assert_eq!(Rank::Kingdom.depth(), Some(0));
        assert_eq!(Rank::Form.depth(), Some(15));
        assert_eq!(Rank::Unranked.depth(), None);
    }
}
