/// The reconciliation engine.
///
/// A pure batch dataflow: normalize per source, union, deduplicate,
/// impute the hierarchy, then rebuild the crosswalks. Every stage fully
/// materializes its output before the next one starts, and a run
/// recomputes everything from the current source tables, so re-running
/// is always safe.
pub mod crosswalk;
pub mod dedup;
pub mod fill;
pub mod unify;

pub use crosswalk::{build_crosswalks, CrosswalkEntry, Crosswalks};
pub use dedup::{deduplicate, DedupOutcome};
pub use fill::{fill_hierarchy, FillOutcome};
pub use unify::{unify, UnifyOutcome};

use crate::model::{CanonicalTaxon, Rank};
use crate::rules::RuleSet;
use crate::sources::{gbif, wfo, wiz, NormalizedSets};
use crate::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Raw per-source tables, already loaded by the ingestion collaborator.
#[derive(Debug, Default)]
pub struct SourceTables {
    pub wfo: Vec<wfo::WfoRow>,
    pub gbif: Vec<gbif::GbifRow>,
    pub wiz_species: Vec<wiz::WizSpeciesRow>,
    pub wiz_infras: Vec<wiz::WizInfraRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub wfo_records: usize,
    pub wfo_dropped: usize,
    pub gbif_records: usize,
    pub gbif_dropped: usize,
    pub gbif_filtered: usize,
    pub wiz_records: usize,
    pub wiz_dropped: usize,
    pub unified_records: usize,
    pub unranked_filtered: usize,
    pub merged_groups: usize,
    pub merged_records: usize,
    pub canonical_taxa: usize,
    pub filled_fields: usize,
    /// Canonical taxa per rank, in rank order.
    pub rank_counts: IndexMap<String, usize>,
    /// Unified records per taxonomic status.
    pub status_counts: IndexMap<String, usize>,
}

#[derive(Debug)]
pub struct ReconcileOutput {
    pub taxa: Vec<CanonicalTaxon>,
    pub crosswalks: Crosswalks,
    pub normalized: NormalizedSets,
    pub stats: RunStats,
}

pub struct Reconciler {
    rules: RuleSet,
}

impl Reconciler {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn run(&self, tables: SourceTables) -> Result<ReconcileOutput> {
        let started_at = Utc::now();

        tracing::info!(
            wfo = tables.wfo.len(),
            gbif = tables.gbif.len(),
            wiz_species = tables.wiz_species.len(),
            wiz_infras = tables.wiz_infras.len(),
            "normalizing source tables"
        );
        let normalized = NormalizedSets {
            wfo: wfo::normalize(tables.wfo, &self.rules),
            gbif: gbif::normalize(tables.gbif, &self.rules),
            wiz: wiz::normalize(tables.wiz_species, tables.wiz_infras, &self.rules),
        };

        let unified = unify(&normalized);
        let unified_records = unified.records.len();
        let unranked_filtered = unified.unranked_filtered;

        let mut status_counts: IndexMap<String, usize> = IndexMap::new();
        for record in &unified.records {
            *status_counts
                .entry(record.taxonomic_status.to_string())
                .or_insert(0) += 1;
        }

        let dedup = deduplicate(unified.records);
        let DedupOutcome {
            mut taxa,
            merged_groups,
            merged_records,
        } = dedup;

        let fill = fill_hierarchy(&mut taxa);

        let crosswalks = build_crosswalks(&taxa, &normalized);

        let mut rank_counts: IndexMap<String, usize> = IndexMap::new();
        for rank in Rank::ORDERED {
            let count = taxa.iter().filter(|t| t.rank == rank).count();
            if count > 0 {
                rank_counts.insert(rank.label().to_string(), count);
            }
        }

        let stats = RunStats {
            started_at,
            wfo_records: normalized.wfo.records.len(),
            wfo_dropped: normalized.wfo.dropped,
            gbif_records: normalized.gbif.records.len(),
            gbif_dropped: normalized.gbif.dropped,
            gbif_filtered: normalized.gbif.filtered,
            wiz_records: normalized.wiz.records.len(),
            wiz_dropped: normalized.wiz.dropped,
            unified_records,
            unranked_filtered,
            merged_groups,
            merged_records,
            canonical_taxa: taxa.len(),
            filled_fields: fill.filled_fields,
            rank_counts,
            status_counts,
        };
        tracing::info!(
            canonical = stats.canonical_taxa,
            merged_groups = stats.merged_groups,
            filled_fields = stats.filled_fields,
            "reconciliation complete"
        );

        Ok(ReconcileOutput {
            taxa,
            crosswalks,
            normalized,
            stats,
        })
    }
}
