use crate::model::Rank;
use serde::{Deserialize, Serialize};

/// Higher-rank classification fields carried by every record.
///
/// All fields are optional; sources differ wildly in how much of the
/// classification they supply, and the HierarchyFiller completes the
/// gaps after deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub subfamily: Option<String>,
    pub tribe: Option<String>,
    pub subtribe: Option<String>,
    pub genus: Option<String>,
    pub subgenus: Option<String>,
    pub section: Option<String>,
}

impl Hierarchy {
    pub fn get(&self, rank: Rank) -> Option<&str> {
        let field = match rank {
            Rank::Kingdom => &self.kingdom,
            Rank::Phylum => &self.phylum,
            Rank::Class => &self.class,
            Rank::Order => &self.order,
            Rank::Family => &self.family,
            Rank::Subfamily => &self.subfamily,
            Rank::Tribe => &self.tribe,
            Rank::Subtribe => &self.subtribe,
            Rank::Genus => &self.genus,
            Rank::Subgenus => &self.subgenus,
            Rank::Section => &self.section,
            _ => return None,
        };
        field.as_deref()
    }

    /// Sets the field for `rank`, ignoring ranks without a field.
    pub fn set(&mut self, rank: Rank, value: Option<String>) {
        let field = match rank {
            Rank::Kingdom => &mut self.kingdom,
            Rank::Phylum => &mut self.phylum,
            Rank::Class => &mut self.class,
            Rank::Order => &mut self.order,
            Rank::Family => &mut self.family,
            Rank::Subfamily => &mut self.subfamily,
            Rank::Tribe => &mut self.tribe,
            Rank::Subtribe => &mut self.subtribe,
            Rank::Genus => &mut self.genus,
            Rank::Subgenus => &mut self.subgenus,
            Rank::Section => &mut self.section,
            _ => return,
        };
        *field = value;
    }

    /// Sets the field for `rank` only when it is currently empty.
    pub fn set_if_empty(&mut self, rank: Rank, value: String) {
        if self.get(rank).is_none() {
            self.set(rank, Some(value));
        }
    }

    /// Hierarchy ranks populated below the given depth. Used by the
    /// rank-order quality check: a species record must not carry, say,
    /// a subgenus value pulled from a deeper rank than its own.
    pub fn populated_below(&self, rank: Rank) -> Vec<Rank> {
        Rank::ORDERED
            .iter()
            .copied()
            .filter(|r| r.has_hierarchy_field() && *r > rank && self.get(*r).is_some())
            .collect()
    }
}
