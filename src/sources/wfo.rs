/// World Flora Online adapter.
///
/// WFO is close to the target shape already: ids arrive with their own
/// "wfo-" prefix, ranks and statuses are explicit, and the Darwin Core
/// export carries structured epithets. Normalization here is mostly
/// case-folding status strings, canonicalizing the display name, and
/// unpacking the IPNI identifier out of its LSID URN.
use crate::model::{Authority, Hierarchy, Rank, TaxonRecord};
use crate::parser::parse_name;
use crate::rules::RuleSet;
use crate::sources::NormalizeOutcome;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WfoRow {
    #[serde(rename = "taxonID")]
    pub taxon_id: String,
    #[serde(rename = "scientificName", default)]
    pub scientific_name: Option<String>,
    #[serde(rename = "taxonRank", default)]
    pub taxon_rank: Option<String>,
    #[serde(rename = "parentNameUsageID", default)]
    pub parent_name_usage_id: Option<String>,
    #[serde(rename = "acceptedNameUsageID", default)]
    pub accepted_name_usage_id: Option<String>,
    #[serde(rename = "originalNameUsageID", default)]
    pub original_name_usage_id: Option<String>,
    #[serde(rename = "taxonomicStatus", default)]
    pub taxonomic_status: Option<String>,
    #[serde(rename = "nomenclaturalStatus", default)]
    pub nomenclatural_status: Option<String>,
    /// IPNI reference as an LSID URN, e.g. "urn:lsid:ipni.org:names:12345-1".
    #[serde(rename = "scientificNameID", default)]
    pub scientific_name_id: Option<String>,
    #[serde(rename = "tplID", default)]
    pub tpl_id: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub genus: Option<String>,
    #[serde(rename = "specificEpithet", default)]
    pub specific_epithet: Option<String>,
    #[serde(rename = "infraspecificEpithet", default)]
    pub infraspecific_epithet: Option<String>,
}

/// Takes the final colon-delimited segment of a scheme-prefixed URN.
fn extract_urn_id(urn: &str) -> Option<String> {
    urn.rsplit(':')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Drops a reference when it points at the record itself.
fn non_self(reference: Option<String>, own_id: &str) -> Option<String> {
    reference.filter(|r| r != own_id)
}

pub fn normalize(rows: Vec<WfoRow>, rules: &RuleSet) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for row in rows {
        let raw_name = match row.scientific_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                outcome.dropped += 1;
                continue;
            }
        };

        let rank = rules.map_rank(row.taxon_rank.as_deref());
        let mut hierarchy = Hierarchy {
            family: row.family.clone(),
            genus: row.genus.clone(),
            ..Hierarchy::default()
        };

        let species_level = rank == Rank::Species || rank.is_infraspecific();
        let (name, generic_name, specific_name, infra_name) = if species_level {
            // Species-level names go through the parser for marker
            // canonicalization and annotation capture.
            match parse_name(&raw_name, rules) {
                Ok(parsed) => {
                    if let Some(subgenus) = parsed.subgenus {
                        hierarchy.set_if_empty(Rank::Subgenus, subgenus);
                    }
                    if let Some(section) = parsed.section {
                        hierarchy.set_if_empty(Rank::Section, section);
                    }
                    hierarchy.set_if_empty(Rank::Genus, parsed.generic_name.clone());
                    (
                        parsed.name,
                        Some(parsed.generic_name),
                        row.specific_epithet.clone().or(parsed.specific_name),
                        row.infraspecific_epithet.clone().or(parsed.infra_name),
                    )
                }
                Err(_) => {
                    outcome.dropped += 1;
                    continue;
                }
            }
        } else {
            let generic = (rank == Rank::Genus).then(|| raw_name.clone());
            if let Some(g) = &generic {
                hierarchy.set_if_empty(Rank::Genus, g.clone());
            }
            (raw_name, generic, None, None)
        };

        outcome.records.push(TaxonRecord {
            parent_id: non_self(row.parent_name_usage_id, &row.taxon_id),
            accepted_id: non_self(row.accepted_name_usage_id, &row.taxon_id),
            original_id: non_self(row.original_name_usage_id, &row.taxon_id),
            name,
            generic_name,
            specific_name,
            infra_name,
            hierarchy,
            rank,
            taxonomic_status: rules.map_taxonomic_status(row.taxonomic_status.as_deref()),
            nomenclatural_status: rules
                .map_nomenclatural_status(row.nomenclatural_status.as_deref()),
            ipni_id: row.scientific_name_id.as_deref().and_then(extract_urn_id),
            tpl_id: row.tpl_id,
            data_source: Authority::Wfo,
            source_id: row.taxon_id,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaxonomicStatus;

    fn row(id: &str, name: &str, rank: &str) -> WfoRow {
        WfoRow {
            taxon_id: id.to_string(),
            scientific_name: Some(name.to_string()),
            taxon_rank: Some(rank.to_string()),
            taxonomic_status: Some("Accepted".to_string()),
            ..WfoRow::default()
        }
    }

    #[test]
    fn ipni_id_extracted_from_urn() {
        let mut r = row("wfo-001", "Drosera regia", "species");
        r.scientific_name_id = Some("urn:lsid:ipni.org:names:12345-1".to_string());
        let outcome = normalize(vec![r], &RuleSet::default());
        assert_eq!(outcome.records[0].ipni_id.as_deref(), Some("12345-1"));
    }

    #[test]
    fn status_is_case_normalized() {
        let outcome = normalize(
            vec![row("wfo-001", "Drosera regia", "species")],
            &RuleSet::default(),
        );
        assert_eq!(
            outcome.records[0].taxonomic_status,
            TaxonomicStatus::Accepted
        );
    }

    #[test]
    fn nameless_rows_are_dropped() {
        let mut r = row("wfo-001", "", "species");
        r.scientific_name = None;
        let outcome = normalize(vec![r], &RuleSet::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn self_parent_reference_is_cleared() {
        let mut r = row("wfo-001", "Drosera regia", "species");
        r.parent_name_usage_id = Some("wfo-001".to_string());
        let outcome = normalize(vec![r], &RuleSet::default());
        assert_eq!(outcome.records[0].parent_id, None);
    }

    #[test]
    fn family_rank_names_skip_epithet_parsing() {
        let outcome = normalize(
            vec![row("wfo-002", "Droseraceae", "family")],
            &RuleSet::default(),
        );
        let record = &outcome.records[0];
        assert_eq!(record.rank, Rank::Family);
        assert_eq!(record.generic_name, None);
        assert_eq!(record.name, "Droseraceae");
    }
}
