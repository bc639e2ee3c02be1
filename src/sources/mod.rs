/// Per-authority adapters turning raw source rows into `TaxonRecord`s.
pub mod gbif;
pub mod wfo;
pub mod wiz;

use crate::model::TaxonRecord;

/// Result of normalizing one source table.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<TaxonRecord>,
    /// Malformed rows dropped (missing name, unparseable epithets).
    pub dropped: usize,
    /// Rows excluded by a deliberate source restriction, such as the
    /// GBIF kingdom/status filter. Not a data quality signal.
    pub filtered: usize,
}

/// All three normalized record sets, kept separate so the
/// CrosswalkBuilder can join each authority back on its own.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSets {
    pub wfo: NormalizeOutcome,
    pub gbif: NormalizeOutcome,
    pub wiz: NormalizeOutcome,
}

impl NormalizedSets {
    pub fn all_records(&self) -> impl Iterator<Item = &TaxonRecord> {
        self.wfo
            .records
            .iter()
            .chain(self.gbif.records.iter())
            .chain(self.wiz.records.iter())
    }

    pub fn record_count(&self) -> usize {
        self.wfo.records.len() + self.gbif.records.len() + self.wiz.records.len()
    }
}
