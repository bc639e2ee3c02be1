/// Curated specialist-list adapter.
///
/// The list ships flat display names with no rank column, so rank and
/// epithets come entirely out of the name parser. Species and
/// infraspecific taxa arrive in separate tables; infraspecific records
/// are parent-linked by matching their genus and species epithet
/// against the species records from the primary table.
use crate::model::{Authority, Hierarchy, Rank, TaxonRecord, TaxonomicStatus};
use crate::parser::{parse_name, ParsedName};
use crate::rules::RuleSet;
use crate::sources::NormalizeOutcome;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct WizSpeciesRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizInfraRow {
    pub id: String,
    pub name: String,
}

fn prefix_id(raw: &str) -> String {
    format!("{}:{}", Authority::Wiz.tag(), raw)
}

fn record_from(parsed: ParsedName, source_id: String, parent_id: Option<String>) -> TaxonRecord {
    let mut hierarchy = Hierarchy {
        genus: Some(parsed.generic_name.clone()),
        ..Hierarchy::default()
    };
    if let Some(subgenus) = parsed.subgenus {
        hierarchy.set_if_empty(Rank::Subgenus, subgenus);
    }
    if let Some(section) = parsed.section {
        hierarchy.set_if_empty(Rank::Section, section);
    }

    TaxonRecord {
        source_id,
        parent_id,
        accepted_id: None,
        original_id: None,
        name: parsed.name,
        generic_name: Some(parsed.generic_name),
        specific_name: parsed.specific_name,
        infra_name: parsed.infra_name,
        hierarchy,
        rank: parsed.rank,
        taxonomic_status: TaxonomicStatus::Accepted,
        nomenclatural_status: None,
        ipni_id: None,
        tpl_id: None,
        data_source: Authority::Wiz,
    }
}

pub fn normalize(
    species_rows: Vec<WizSpeciesRow>,
    infra_rows: Vec<WizInfraRow>,
    rules: &RuleSet,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    // Primary table first: species-rank records also feed the parent
    // index used to attach infraspecific records afterwards.
    let mut species_index: HashMap<(String, String), String> = HashMap::new();

    for row in species_rows {
        let parsed = match parse_name(&row.name, rules) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(name = %row.name, error = %e, "dropping unparseable species row");
                outcome.dropped += 1;
                continue;
            }
        };
        let source_id = prefix_id(&row.id);
        if parsed.rank == Rank::Species {
            if let Some(specific) = &parsed.specific_name {
                species_index
                    .entry((parsed.generic_name.clone(), specific.clone()))
                    .or_insert_with(|| source_id.clone());
            }
        }
        outcome.records.push(record_from(parsed, source_id, None));
    }

    for row in infra_rows {
        let parsed = match parse_name(&row.name, rules) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(name = %row.name, error = %e, "dropping unparseable infra row");
                outcome.dropped += 1;
                continue;
            }
        };
        let parent_id = match (&parsed.generic_name, &parsed.specific_name) {
            (genus, Some(specific)) => species_index.get(&(genus.clone(), specific.clone())),
            _ => None,
        }
        .cloned();
        let source_id = prefix_id(&row.id);
        // An infra record is never its own parent even if ids collide
        // across the two tables.
        let parent_id = parent_id.filter(|p| *p != source_id);
        outcome.records.push(record_from(parsed, source_id, parent_id));
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn species(id: &str, name: &str) -> WizSpeciesRow {
        WizSpeciesRow {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn infra(id: &str, name: &str) -> WizInfraRow {
        WizInfraRow {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn rank_is_inferred_without_a_rank_column() {
        let outcome = normalize(
            vec![species("10", "Drosera regia")],
            vec![],
            &RuleSet::default(),
        );
        let record = &outcome.records[0];
        assert_eq!(record.rank, Rank::Species);
        assert_eq!(record.source_id, "wiz:10");
        assert_eq!(record.generic_name.as_deref(), Some("Drosera"));
    }

    #[test]
    fn infras_are_linked_to_their_species() {
        let outcome = normalize(
            vec![species("10", "Drosera regia")],
            vec![infra("200", "Drosera regia var. alba")],
            &RuleSet::default(),
        );
        let infra_record = outcome
            .records
            .iter()
            .find(|r| r.rank == Rank::Variety)
            .unwrap();
        assert_eq!(infra_record.parent_id.as_deref(), Some("wiz:10"));
        assert_eq!(infra_record.infra_name.as_deref(), Some("alba"));
    }

    #[test]
    fn unmatched_infra_has_no_parent() {
        let outcome = normalize(
            vec![species("10", "Drosera regia")],
            vec![infra("200", "Drosera capensis var. alba")],
            &RuleSet::default(),
        );
        let infra_record = outcome
            .records
            .iter()
            .find(|r| r.rank == Rank::Variety)
            .unwrap();
        assert_eq!(infra_record.parent_id, None);
    }

    #[test]
    fn unparseable_names_are_dropped_not_fabricated() {
        let outcome = normalize(
            vec![species("10", "Drosera")],
            vec![],
            &RuleSet::default(),
        );
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.dropped, 1);
    }
}
