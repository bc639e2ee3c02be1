/// Cross-source deduplication.
///
/// Only records with an infraspecific epithet are merge candidates;
/// species- and genus-level duplicates across authorities are tolerated
/// and resolved at serving time through the crosswalk tables. Within a
/// duplicate group, members are first clustered by (name, rank) so that
/// the same treatment contributed by several authorities counts once
/// with multiple corroborating sources, then ranked:
///
///   1. distinct contributing sources, descending
///   2. rank preference subspecies < variety < form
///   3. name, ascending
///
/// The top cluster supplies every scalar field; external ids and source
/// tags are unioned over the whole group so no contribution is lost.
use crate::model::{CanonicalTaxon, Rank, TaxonRecord};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub taxa: Vec<CanonicalTaxon>,
    /// Duplicate groups actually merged (group size > 1).
    pub merged_groups: usize,
    /// Records absorbed into a merged group beyond its winner.
    pub merged_records: usize,
}

/// Deliberate bias toward the more specific treatment when sources
/// disagree on the rank of the same epithet triple.
fn rank_preference(rank: Rank) -> u8 {
    match rank {
        Rank::Subspecies => 0,
        Rank::Variety => 1,
        Rank::Form => 2,
        _ => 3,
    }
}

fn singleton(record: TaxonRecord) -> CanonicalTaxon {
    CanonicalTaxon {
        id: 0,
        external_ids: record.external_ids().into_iter().collect(),
        data_sources: [record.data_source].into_iter().collect(),
        name: record.name,
        rank: record.rank,
        generic_name: record.generic_name,
        specific_name: record.specific_name,
        infra_name: record.infra_name,
        hierarchy: record.hierarchy,
    }
}

fn merge_group(records: Vec<TaxonRecord>) -> CanonicalTaxon {
    let mut clusters: IndexMap<(String, Rank), Vec<&TaxonRecord>> = IndexMap::new();
    for record in &records {
        clusters
            .entry((record.name.clone(), record.rank))
            .or_default()
            .push(record);
    }

    let winner = clusters
        .values()
        .min_by_key(|members| {
            let sources: BTreeSet<_> = members.iter().map(|r| r.data_source).collect();
            (
                std::cmp::Reverse(sources.len()),
                rank_preference(members[0].rank),
                members[0].name.clone(),
            )
        })
        .expect("duplicate group is never empty")[0];

    let mut canonical = CanonicalTaxon {
        id: 0,
        name: winner.name.clone(),
        rank: winner.rank,
        generic_name: winner.generic_name.clone(),
        specific_name: winner.specific_name.clone(),
        infra_name: winner.infra_name.clone(),
        hierarchy: winner.hierarchy.clone(),
        external_ids: BTreeSet::new(),
        data_sources: BTreeSet::new(),
    };
    for record in &records {
        canonical.external_ids.extend(record.external_ids());
        canonical.data_sources.insert(record.data_source);
    }
    canonical
}

pub fn deduplicate(records: Vec<TaxonRecord>) -> DedupOutcome {
    let mut groups: IndexMap<(String, String, String), Vec<TaxonRecord>> = IndexMap::new();
    let mut passthrough: Vec<TaxonRecord> = Vec::new();

    for record in records {
        match record.dedup_key() {
            Some(key) => groups.entry(key).or_default().push(record),
            None => passthrough.push(record),
        }
    }

    let mut merged_groups = 0;
    let mut merged_records = 0;
    for group in groups.values() {
        if group.len() > 1 {
            merged_groups += 1;
            merged_records += group.len() - 1;
        }
    }

    // Groups never interact, so merging is safe to run in parallel;
    // rayon's ordered collect keeps the output deterministic.
    let grouped: Vec<Vec<TaxonRecord>> = groups.into_values().collect();
    let mut taxa: Vec<CanonicalTaxon> = grouped
        .into_par_iter()
        .map(|group| {
            if group.len() > 1 {
                merge_group(group)
            } else {
                let record = group.into_iter().next().expect("group is never empty");
                singleton(record)
            }
        })
        .collect();
    taxa.extend(passthrough.into_iter().map(singleton));

    for (index, taxon) in taxa.iter_mut().enumerate() {
        taxon.id = index as u64 + 1;
    }

    tracing::debug!(
        canonical = taxa.len(),
        merged_groups,
        merged_records,
        "deduplicated unified records"
    );

    DedupOutcome {
        taxa,
        merged_groups,
        merged_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Authority, Hierarchy, TaxonomicStatus};
    use pretty_assertions::assert_eq;

    fn record(
        source_id: &str,
        name: &str,
        rank: Rank,
        infra: Option<&str>,
        authority: Authority,
    ) -> TaxonRecord {
        TaxonRecord {
            source_id: source_id.to_string(),
            parent_id: None,
            accepted_id: None,
            original_id: None,
            name: name.to_string(),
            generic_name: Some("Drosera".to_string()),
            specific_name: Some("regia".to_string()),
            infra_name: infra.map(|i| i.to_string()),
            hierarchy: Hierarchy::default(),
            rank,
            taxonomic_status: TaxonomicStatus::Accepted,
            nomenclatural_status: None,
            ipni_id: None,
            tpl_id: None,
            data_source: authority,
        }
    }

    #[test]
    fn species_records_pass_through_unmerged() {
        let records = vec![
            record("wfo-1", "Drosera regia", Rank::Species, None, Authority::Wfo),
            record("gbif:2", "Drosera regia", Rank::Species, None, Authority::Gbif),
        ];
        let outcome = deduplicate(records);
        assert_eq!(outcome.taxa.len(), 2);
        assert_eq!(outcome.merged_groups, 0);
    }

    #[test]
    fn corroboration_beats_rank_preference() {
        // Two sources agree on the variety treatment; one source says
        // subspecies. The better-corroborated variety wins even though
        // subspecies ranks first in the preference order.
        let records = vec![
            record(
                "wfo-1",
                "Drosera regia ssp. alba",
                Rank::Subspecies,
                Some("alba"),
                Authority::Wfo,
            ),
            record(
                "gbif:2",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Gbif,
            ),
            record(
                "wiz:3",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Wiz,
            ),
        ];
        let outcome = deduplicate(records);
        assert_eq!(outcome.taxa.len(), 1);
        let taxon = &outcome.taxa[0];
        assert_eq!(taxon.rank, Rank::Variety);
        assert_eq!(taxon.name, "Drosera regia var. alba");
        assert_eq!(taxon.external_ids.len(), 3);
        assert_eq!(taxon.data_sources.len(), 3);
    }

    #[test]
    fn rank_preference_breaks_source_count_ties() {
        let records = vec![
            record(
                "wfo-1",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Wfo,
            ),
            record(
                "gbif:2",
                "Drosera regia ssp. alba",
                Rank::Subspecies,
                Some("alba"),
                Authority::Gbif,
            ),
        ];
        let outcome = deduplicate(records);
        assert_eq!(outcome.taxa.len(), 1);
        assert_eq!(outcome.taxa[0].rank, Rank::Subspecies);
    }

    #[test]
    fn external_ids_union_spans_the_whole_group() {
        let mut loser = record(
            "wfo-1",
            "Drosera regia ssp. alba",
            Rank::Subspecies,
            Some("alba"),
            Authority::Wfo,
        );
        loser.ipni_id = Some("77777-1".to_string());
        let records = vec![
            loser,
            record(
                "gbif:2",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Gbif,
            ),
            record(
                "wiz:3",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Wiz,
            ),
        ];
        let outcome = deduplicate(records);
        let taxon = &outcome.taxa[0];
        // Losing member's ipni cross-reference is retained.
        assert!(taxon.external_ids.iter().any(|e| e.id == "77777-1"));
    }

    #[test]
    fn dedup_is_idempotent_over_its_own_output() {
        let records = vec![
            record(
                "wfo-1",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Wfo,
            ),
            record(
                "gbif:2",
                "Drosera regia var. alba",
                Rank::Variety,
                Some("alba"),
                Authority::Gbif,
            ),
        ];
        let outcome = deduplicate(records);
        assert_eq!(outcome.taxa.len(), 1);
        // Re-grouping the output by dedup key finds no group > 1.
        let mut keys = std::collections::HashMap::new();
        for taxon in &outcome.taxa {
            if let (Some(g), Some(s), Some(i)) = (
                &taxon.generic_name,
                &taxon.specific_name,
                &taxon.infra_name,
            ) {
                *keys.entry((g.clone(), s.clone(), i.clone())).or_insert(0) += 1;
            }
        }
        assert!(keys.values().all(|count| *count == 1));
    }
}
