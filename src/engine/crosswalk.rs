/// Crosswalk construction.
///
/// Joins the canonical set back to each authority's normalized records
/// on exact equality of (rank, generic name, specific name, infra
/// name), yielding one canonical-id -> source-id row per source record.
/// Where several canonical taxa share a key (species-level duplicates
/// are tolerated by design) the lowest canonical id wins, which is the
/// taxon created from the earliest record. A record whose key misses,
/// usually because its treatment lost a dedup tie-break, still resolves
/// through the external-id union of the merged taxon. Unranked records
/// were dropped at the union stage and are not joined. Source records
/// that match nothing either way are collected so the
/// referential-integrity audit can report them.
use crate::model::{CanonicalTaxon, ExternalId, Rank, TaxonRecord};
use crate::sources::NormalizedSets;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct CrosswalkEntry {
    pub canonical_id: u64,
    pub external_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct Crosswalks {
    pub wfo: Vec<CrosswalkEntry>,
    pub gbif: Vec<CrosswalkEntry>,
    pub wiz: Vec<CrosswalkEntry>,
    /// Derived from WFO records carrying an IPNI reference.
    pub ipni: Vec<CrosswalkEntry>,
    /// Derived from WFO records carrying a TPL reference.
    pub tpl: Vec<CrosswalkEntry>,
    /// Source ids that joined to no canonical taxon.
    pub unmatched: Vec<String>,
}

type MatchKey = (Rank, Option<String>, Option<String>, Option<String>);

fn key_of(record: &TaxonRecord) -> MatchKey {
    (
        record.rank,
        record.generic_name.clone(),
        record.specific_name.clone(),
        record.infra_name.clone(),
    )
}

pub fn build_crosswalks(taxa: &[CanonicalTaxon], normalized: &NormalizedSets) -> Crosswalks {
    let mut index: HashMap<MatchKey, u64> = HashMap::new();
    for taxon in taxa {
        let key = (
            taxon.rank,
            taxon.generic_name.clone(),
            taxon.specific_name.clone(),
            taxon.infra_name.clone(),
        );
        // Lowest id wins on key collisions; taxa arrive id-ascending.
        index.entry(key).or_insert(taxon.id);
    }

    let mut id_index: HashMap<&ExternalId, u64> = HashMap::new();
    for taxon in taxa {
        for external in &taxon.external_ids {
            id_index.entry(external).or_insert(taxon.id);
        }
    }

    let mut join = |records: &[TaxonRecord],
                    out: &mut Vec<CrosswalkEntry>,
                    unmatched: &mut Vec<String>,
                    ipni: &mut Vec<CrosswalkEntry>,
                    tpl: &mut Vec<CrosswalkEntry>| {
        for record in records {
            if record.rank == Rank::Unranked {
                continue;
            }
            let own_id = ExternalId::new(record.data_source.into(), record.source_id.clone());
            let resolved = index
                .get(&key_of(record))
                .or_else(|| id_index.get(&own_id))
                .copied();
            match resolved {
                Some(canonical_id) => {
                    out.push(CrosswalkEntry {
                        canonical_id,
                        external_id: record.source_id.clone(),
                    });
                    if let Some(ipni_id) = &record.ipni_id {
                        ipni.push(CrosswalkEntry {
                            canonical_id,
                            external_id: ipni_id.clone(),
                        });
                    }
                    if let Some(tpl_id) = &record.tpl_id {
                        tpl.push(CrosswalkEntry {
                            canonical_id,
                            external_id: tpl_id.clone(),
                        });
                    }
                }
                None => unmatched.push(record.source_id.clone()),
            }
        }
    };

    let mut wfo = Vec::new();
    let mut gbif = Vec::new();
    let mut wiz = Vec::new();
    let mut ipni = Vec::new();
    let mut tpl = Vec::new();
    let mut unmatched = Vec::new();

    join(&normalized.wfo.records, &mut wfo, &mut unmatched, &mut ipni, &mut tpl);
    join(&normalized.gbif.records, &mut gbif, &mut unmatched, &mut ipni, &mut tpl);
    join(&normalized.wiz.records, &mut wiz, &mut unmatched, &mut ipni, &mut tpl);

    let crosswalks = Crosswalks {
        wfo,
        gbif,
        wiz,
        ipni,
        tpl,
        unmatched,
    };

    tracing::debug!(
        wfo = crosswalks.wfo.len(),
        gbif = crosswalks.gbif.len(),
        wiz = crosswalks.wiz.len(),
        ipni = crosswalks.ipni.len(),
        tpl = crosswalks.tpl.len(),
        unmatched = crosswalks.unmatched.len(),
        "built crosswalk tables"
    );
    crosswalks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dedup::deduplicate;
    use crate::model::{Authority, Hierarchy, TaxonomicStatus};
    use crate::sources::NormalizeOutcome;

    fn record(source_id: &str, infra: Option<&str>, authority: Authority) -> TaxonRecord {
        TaxonRecord {
            source_id: source_id.to_string(),
            parent_id: None,
            accepted_id: None,
            original_id: None,
            name: "Drosera regia var. alba".to_string(),
            generic_name: Some("Drosera".to_string()),
            specific_name: Some("regia".to_string()),
            infra_name: infra.map(|i| i.to_string()),
            hierarchy: Hierarchy::default(),
            rank: if infra.is_some() {
                Rank::Variety
            } else {
                Rank::Species
            },
            taxonomic_status: TaxonomicStatus::Accepted,
            nomenclatural_status: None,
            ipni_id: None,
            tpl_id: None,
            data_source: authority,
        }
    }

    #[test]
    fn every_source_record_joins_back() {
        let wfo_record = record("wfo-1", Some("alba"), Authority::Wfo);
        let gbif_record = record("gbif:2", Some("alba"), Authority::Gbif);
        let outcome = deduplicate(vec![wfo_record.clone(), gbif_record.clone()]);

        let normalized = NormalizedSets {
            wfo: NormalizeOutcome {
                records: vec![wfo_record],
                ..NormalizeOutcome::default()
            },
            gbif: NormalizeOutcome {
                records: vec![gbif_record],
                ..NormalizeOutcome::default()
            },
            ..NormalizedSets::default()
        };

        let crosswalks = build_crosswalks(&outcome.taxa, &normalized);
        assert_eq!(crosswalks.wfo.len(), 1);
        assert_eq!(crosswalks.gbif.len(), 1);
        assert!(crosswalks.unmatched.is_empty());
        assert_eq!(crosswalks.wfo[0].canonical_id, crosswalks.gbif[0].canonical_id);
    }

    #[test]
    fn losing_treatment_resolves_through_external_ids() {
        let wfo_record = record("wfo-1", Some("alba"), Authority::Wfo);
        let gbif_record = record("gbif:2", Some("alba"), Authority::Gbif);
        let mut wiz_record = record("wiz:3", Some("alba"), Authority::Wiz);
        wiz_record.rank = Rank::Subspecies;
        wiz_record.name = "Drosera regia ssp. alba".to_string();

        let outcome = deduplicate(vec![
            wfo_record.clone(),
            gbif_record.clone(),
            wiz_record.clone(),
        ]);
        assert_eq!(outcome.taxa.len(), 1);

        let normalized = NormalizedSets {
            wfo: NormalizeOutcome {
                records: vec![wfo_record],
                ..NormalizeOutcome::default()
            },
            gbif: NormalizeOutcome {
                records: vec![gbif_record],
                ..NormalizeOutcome::default()
            },
            wiz: NormalizeOutcome {
                records: vec![wiz_record],
                ..NormalizeOutcome::default()
            },
        };

        let crosswalks = build_crosswalks(&outcome.taxa, &normalized);
        assert_eq!(crosswalks.wiz.len(), 1);
        assert_eq!(crosswalks.wiz[0].canonical_id, outcome.taxa[0].id);
        assert!(crosswalks.unmatched.is_empty());
    }

    #[test]
    fn derived_ipni_crosswalk_rides_on_wfo() {
        let mut wfo_record = record("wfo-1", None, Authority::Wfo);
        wfo_record.ipni_id = Some("12345-1".to_string());
        let outcome = deduplicate(vec![wfo_record.clone()]);

        let normalized = NormalizedSets {
            wfo: NormalizeOutcome {
                records: vec![wfo_record],
                ..NormalizeOutcome::default()
            },
            ..NormalizedSets::default()
        };

        let crosswalks = build_crosswalks(&outcome.taxa, &normalized);
        assert_eq!(crosswalks.ipni.len(), 1);
        assert_eq!(crosswalks.ipni[0].external_id, "12345-1");
    }
}
