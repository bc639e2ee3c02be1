/// GBIF backbone adapter.
///
/// The backbone covers every kingdom and every status; this engine only
/// wants accepted plants, so the restriction happens here, at the edge.
/// GBIF keys are plain integers and would collide with other
/// authorities, so every identifier is prefixed with the source tag.
/// The backbone has no single display name for infraspecific taxa;
/// those names are rebuilt from the structured epithet columns.
use crate::model::{Authority, Hierarchy, Rank, TaxonRecord, TaxonomicStatus};
use crate::parser::parse_name;
use crate::rules::RuleSet;
use crate::sources::NormalizeOutcome;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GbifRow {
    #[serde(rename = "taxonID")]
    pub taxon_id: i64,
    #[serde(rename = "canonicalName", default)]
    pub canonical_name: Option<String>,
    #[serde(rename = "scientificName", default)]
    pub scientific_name: Option<String>,
    #[serde(rename = "taxonRank", default)]
    pub taxon_rank: Option<String>,
    #[serde(rename = "taxonomicStatus", default)]
    pub taxonomic_status: Option<String>,
    #[serde(rename = "nomenclaturalStatus", default)]
    pub nomenclatural_status: Option<String>,
    #[serde(rename = "parentNameUsageID", default)]
    pub parent_name_usage_id: Option<i64>,
    #[serde(rename = "acceptedNameUsageID", default)]
    pub accepted_name_usage_id: Option<i64>,
    #[serde(rename = "originalNameUsageID", default)]
    pub original_name_usage_id: Option<i64>,
    #[serde(default)]
    pub kingdom: Option<String>,
    #[serde(default)]
    pub phylum: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub genus: Option<String>,
    #[serde(rename = "genericName", default)]
    pub generic_name: Option<String>,
    #[serde(rename = "specificEpithet", default)]
    pub specific_epithet: Option<String>,
    #[serde(rename = "infraspecificEpithet", default)]
    pub infraspecific_epithet: Option<String>,
}

fn prefix_id(key: i64) -> String {
    format!("{}:{}", Authority::Gbif.tag(), key)
}

fn non_self(reference: Option<i64>, own: i64) -> Option<String> {
    reference.filter(|r| *r != own).map(prefix_id)
}

pub fn normalize(rows: Vec<GbifRow>, rules: &RuleSet) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for row in rows {
        let status = rules.map_taxonomic_status(row.taxonomic_status.as_deref());
        let is_plant = row.kingdom.as_deref() == Some("Plantae");
        if !is_plant || status != TaxonomicStatus::Accepted {
            outcome.filtered += 1;
            continue;
        }

        let rank = rules.map_rank(row.taxon_rank.as_deref());
        let mut hierarchy = Hierarchy {
            kingdom: row.kingdom.clone(),
            phylum: row.phylum.clone(),
            class: row.class.clone(),
            order: row.order.clone(),
            family: row.family.clone(),
            genus: row.genus.clone(),
            ..Hierarchy::default()
        };

        let (name, generic_name, specific_name, infra_name) = if rank.is_infraspecific() {
            // Reconstruct "<genus> <species> <marker> <infra>"; the
            // backbone does not ship a display name at these ranks.
            let marker = match rules.marker_for_rank(rank) {
                Some(m) => m.canonical.clone(),
                None => {
                    outcome.dropped += 1;
                    continue;
                }
            };
            match (
                row.generic_name.clone().or_else(|| row.genus.clone()),
                row.specific_epithet.clone(),
                row.infraspecific_epithet.clone(),
            ) {
                (Some(genus), Some(species), Some(infra)) => (
                    format!("{genus} {species} {marker} {infra}"),
                    Some(genus),
                    Some(species),
                    Some(infra),
                ),
                _ => {
                    outcome.dropped += 1;
                    continue;
                }
            }
        } else {
            let raw_name = match row
                .canonical_name
                .as_deref()
                .or(row.scientific_name.as_deref())
                .map(str::trim)
            {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => {
                    outcome.dropped += 1;
                    continue;
                }
            };
            if rank == Rank::Species {
                match parse_name(&raw_name, rules) {
                    Ok(parsed) => {
                        hierarchy.set_if_empty(Rank::Genus, parsed.generic_name.clone());
                        (
                            parsed.name,
                            Some(parsed.generic_name),
                            row.specific_epithet.clone().or(parsed.specific_name),
                            None,
                        )
                    }
                    Err(_) => {
                        outcome.dropped += 1;
                        continue;
                    }
                }
            } else {
                let generic = (rank == Rank::Genus).then(|| raw_name.clone());
                (raw_name, generic, None, None)
            }
        };

        outcome.records.push(TaxonRecord {
            source_id: prefix_id(row.taxon_id),
            parent_id: non_self(row.parent_name_usage_id, row.taxon_id),
            accepted_id: non_self(row.accepted_name_usage_id, row.taxon_id),
            original_id: non_self(row.original_name_usage_id, row.taxon_id),
            name,
            generic_name,
            specific_name,
            infra_name,
            hierarchy,
            rank,
            taxonomic_status: status,
            nomenclatural_status: rules
                .map_nomenclatural_status(row.nomenclatural_status.as_deref()),
            ipni_id: None,
            tpl_id: None,
            data_source: Authority::Gbif,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, rank: &str) -> GbifRow {
        GbifRow {
            taxon_id: id,
            canonical_name: Some(name.to_string()),
            taxon_rank: Some(rank.to_string()),
            taxonomic_status: Some("accepted".to_string()),
            kingdom: Some("Plantae".to_string()),
            ..GbifRow::default()
        }
    }

    #[test]
    fn ids_are_source_prefixed() {
        let outcome = normalize(vec![row(42, "Drosera regia", "species")], &RuleSet::default());
        assert_eq!(outcome.records[0].source_id, "gbif:42");
    }

    #[test]
    fn non_plants_are_filtered() {
        let mut r = row(1, "Felis catus", "species");
        r.kingdom = Some("Animalia".to_string());
        let outcome = normalize(vec![r], &RuleSet::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.filtered, 1);
    }

    #[test]
    fn synonyms_are_filtered() {
        let mut r = row(1, "Drosera regia", "species");
        r.taxonomic_status = Some("synonym".to_string());
        let outcome = normalize(vec![r], &RuleSet::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.filtered, 1);
    }

    #[test]
    fn infraspecific_names_are_reconstructed() {
        let mut r = row(7, "", "variety");
        r.canonical_name = None;
        r.generic_name = Some("Drosera".to_string());
        r.specific_epithet = Some("regia".to_string());
        r.infraspecific_epithet = Some("alba".to_string());
        let outcome = normalize(vec![r], &RuleSet::default());
        let record = &outcome.records[0];
        assert_eq!(record.name, "Drosera regia var. alba");
        assert_eq!(record.rank, Rank::Variety);
        assert_eq!(record.infra_name.as_deref(), Some("alba"));
    }

    #[test]
    fn infraspecific_without_epithets_is_dropped() {
        let mut r = row(7, "", "subspecies");
        r.canonical_name = None;
        let outcome = normalize(vec![r], &RuleSet::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.dropped, 1);
    }
}
