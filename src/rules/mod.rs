/// Rule tables driving the reconciliation engine.
///
/// Everything subject to curation lives here as data: the ordered rank
/// list, raw-string mappings into the two status enums, the valid
/// parent/child rank transitions and the ordered infraspecific marker
/// table. The algorithms in `parser` and `engine` are generic loops
/// over these tables, so curators can adjust them without touching
/// code. A compiled-in default matches the shipped rule file.
use crate::model::{NomenclaturalStatus, Rank, TaxonomicStatus};
use crate::{HerbariumError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One infraspecific marker concept. `spellings` are all real-world
/// variants; `canonical` is the single spelling kept in display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfraMarker {
    pub rank: Rank,
    pub canonical: String,
    pub spellings: Vec<String>,
}

impl InfraMarker {
    pub fn matches(&self, token: &str) -> bool {
        self.spellings.iter().any(|s| s == token)
    }
}

/// One valid parent rank -> child ranks edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTransition {
    pub parent: Rank,
    pub children: Vec<Rank>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// The sixteen ranks, broadest first. Must match `Rank::ORDERED`;
    /// kept in the file so the ordering is visible and reviewable.
    pub rank_order: Vec<Rank>,
    /// Raw rank strings (lowercased) accepted from sources.
    pub rank_aliases: IndexMap<String, Rank>,
    pub taxonomic_status_aliases: IndexMap<String, TaxonomicStatus>,
    pub nomenclatural_status_aliases: IndexMap<String, NomenclaturalStatus>,
    /// Priority-ordered: the first marker with a hit in a name decides
    /// the rank, regardless of where later-priority markers occur.
    pub markers: Vec<InfraMarker>,
    /// Valid parent rank -> child ranks transitions.
    pub rank_transitions: Vec<RankTransition>,
}

impl RuleSet {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let rules: RuleSet = toml::from_str(&raw)
            .map_err(|e| HerbariumError::Rules(format!("{}: {}", path.display(), e)))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rank_order.len() != Rank::ORDERED.len() {
            return Err(HerbariumError::Rules(format!(
                "rank_order must list all {} ranks, found {}",
                Rank::ORDERED.len(),
                self.rank_order.len()
            )));
        }
        for (expected, found) in Rank::ORDERED.iter().zip(&self.rank_order) {
            if expected != found {
                return Err(HerbariumError::Rules(format!(
                    "rank_order out of sequence: expected {expected}, found {found}"
                )));
            }
        }
        if self.markers.is_empty() {
            return Err(HerbariumError::Rules("marker table is empty".to_string()));
        }
        for marker in &self.markers {
            if !marker.matches(&marker.canonical) {
                return Err(HerbariumError::Rules(format!(
                    "canonical spelling '{}' missing from its own spellings list",
                    marker.canonical
                )));
            }
            if !matches!(marker.rank, Rank::Species | Rank::Subspecies | Rank::Variety | Rank::Form)
            {
                return Err(HerbariumError::Rules(format!(
                    "marker '{}' targets non-species-level rank {}",
                    marker.canonical, marker.rank
                )));
            }
        }
        Ok(())
    }

    /// Maps a raw source rank string. Unknown or missing strings become
    /// `Unranked`; the union stage filters those out.
    pub fn map_rank(&self, raw: Option<&str>) -> Rank {
        raw.map(|r| r.trim().to_lowercase())
            .and_then(|r| self.rank_aliases.get(r.as_str()).copied())
            .unwrap_or(Rank::Unranked)
    }

    /// Maps a raw taxonomic status string, defaulting to `Unresolved`.
    pub fn map_taxonomic_status(&self, raw: Option<&str>) -> TaxonomicStatus {
        raw.map(|s| s.trim().to_lowercase())
            .and_then(|s| self.taxonomic_status_aliases.get(s.as_str()).copied())
            .unwrap_or(TaxonomicStatus::Unresolved)
    }

    pub fn map_nomenclatural_status(&self, raw: Option<&str>) -> Option<NomenclaturalStatus> {
        raw.map(|s| s.trim().to_lowercase())
            .and_then(|s| self.nomenclatural_status_aliases.get(s.as_str()).copied())
    }

    /// First marker (in priority order) matching a token spelling.
    pub fn marker_for_spelling(&self, token: &str) -> Option<&InfraMarker> {
        self.markers.iter().find(|m| m.matches(token))
    }

    /// Canonical marker for an infraspecific rank, used when a display
    /// name has to be reconstructed from structured epithets.
    pub fn marker_for_rank(&self, rank: Rank) -> Option<&InfraMarker> {
        self.markers.iter().find(|m| m.rank == rank)
    }

    pub fn is_valid_transition(&self, parent: Rank, child: Rank) -> bool {
        self.rank_transitions
            .iter()
            .find(|t| t.parent == parent)
            .map(|t| t.children.contains(&child))
            .unwrap_or(false)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        let mut rank_aliases = IndexMap::new();
        for rank in Rank::ORDERED {
            rank_aliases.insert(rank.label().to_string(), rank);
        }
        // Variant spellings seen in source exports.
        for (alias, rank) in [
            ("var.", Rank::Variety),
            ("var", Rank::Variety),
            ("subsp.", Rank::Subspecies),
            ("subsp", Rank::Subspecies),
            ("ssp.", Rank::Subspecies),
            ("f.", Rank::Form),
            ("forma", Rank::Form),
            ("unranked", Rank::Unranked),
        ] {
            rank_aliases.insert(alias.to_string(), rank);
        }

        let mut taxonomic_status_aliases = IndexMap::new();
        for (alias, status) in [
            ("accepted", TaxonomicStatus::Accepted),
            ("valid", TaxonomicStatus::Accepted),
            ("synonym", TaxonomicStatus::Synonym),
            ("invalid", TaxonomicStatus::Invalid),
            ("unresolved", TaxonomicStatus::Unresolved),
            ("doubtful", TaxonomicStatus::Unresolved),
            ("uncertain", TaxonomicStatus::Unresolved),
            ("misapplied", TaxonomicStatus::Misapplied),
        ] {
            taxonomic_status_aliases.insert(alias.to_string(), status);
        }

        let mut nomenclatural_status_aliases = IndexMap::new();
        for (alias, status) in [
            ("legitimate", NomenclaturalStatus::Legitimate),
            ("illegitimate", NomenclaturalStatus::Illegitimate),
            ("superfluous", NomenclaturalStatus::Superfluous),
            ("rejected", NomenclaturalStatus::Rejected),
            ("invalid", NomenclaturalStatus::Invalid),
        ] {
            nomenclatural_status_aliases.insert(alias.to_string(), status);
        }

        // Priority order matters: "ssp." would otherwise be shadowed by
        // a substring match against "sp.", and sources disagree on
        // which spelling they emit.
        let markers = vec![
            InfraMarker {
                rank: Rank::Variety,
                canonical: "var.".to_string(),
                spellings: vec!["var.".to_string(), "var".to_string(), "v.".to_string()],
            },
            InfraMarker {
                rank: Rank::Subspecies,
                canonical: "ssp.".to_string(),
                spellings: vec![
                    "ssp.".to_string(),
                    "ssp".to_string(),
                    "subsp.".to_string(),
                    "subsp".to_string(),
                ],
            },
            InfraMarker {
                rank: Rank::Form,
                canonical: "f.".to_string(),
                spellings: vec![
                    "f.".to_string(),
                    "fo.".to_string(),
                    "form.".to_string(),
                    "forma".to_string(),
                ],
            },
            InfraMarker {
                rank: Rank::Species,
                canonical: "cf.".to_string(),
                spellings: vec!["cf.".to_string()],
            },
            InfraMarker {
                rank: Rank::Species,
                canonical: "aff.".to_string(),
                spellings: vec!["aff.".to_string()],
            },
            InfraMarker {
                rank: Rank::Species,
                canonical: "sp.".to_string(),
                spellings: vec!["sp.".to_string(), "spp.".to_string()],
            },
        ];

        let mut rank_transitions = Vec::new();
        for (parent, children) in [
            (Rank::Kingdom, vec![Rank::Phylum]),
            (Rank::Phylum, vec![Rank::Class]),
            (Rank::Class, vec![Rank::Order]),
            (Rank::Order, vec![Rank::Family]),
            (Rank::Family, vec![Rank::Subfamily, Rank::Tribe, Rank::Genus]),
            (Rank::Subfamily, vec![Rank::Tribe, Rank::Genus]),
            (Rank::Tribe, vec![Rank::Subtribe, Rank::Genus]),
            (Rank::Subtribe, vec![Rank::Genus]),
            (Rank::Genus, vec![Rank::Subgenus, Rank::Section, Rank::Species]),
            (Rank::Subgenus, vec![Rank::Section, Rank::Species]),
            (Rank::Section, vec![Rank::Subsection, Rank::Species]),
            (Rank::Subsection, vec![Rank::Species]),
            (Rank::Species, vec![Rank::Subspecies, Rank::Variety, Rank::Form]),
            (Rank::Subspecies, vec![Rank::Variety, Rank::Form]),
            (Rank::Variety, vec![Rank::Form]),
        ] {
            rank_transitions.push(RankTransition { parent, children });
        }

        RuleSet {
            rank_order: Rank::ORDERED.to_vec(),
            rank_aliases,
            taxonomic_status_aliases,
            nomenclatural_status_aliases,
            markers,
            rank_transitions,
        }
    }
}
