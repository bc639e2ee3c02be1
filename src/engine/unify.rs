/// Structural union of the normalized record sets.
///
/// Columns already line up because every adapter emits `TaxonRecord`;
/// the one semantic decision here is the unranked filter. Records that
/// mapped to `Unranked` are excluded at this stage and only at this
/// stage: adapters pass them through untouched and downstream stages
/// assume they are gone. Moving this filter would silently change
/// which records the Deduplicator and CrosswalkBuilder ever see.
use crate::model::{Rank, TaxonRecord};
use crate::sources::NormalizedSets;

#[derive(Debug, Clone, Default)]
pub struct UnifyOutcome {
    pub records: Vec<TaxonRecord>,
    pub unranked_filtered: usize,
}

pub fn unify(sets: &NormalizedSets) -> UnifyOutcome {
    let mut outcome = UnifyOutcome::default();
    for record in sets.all_records() {
        if record.rank == Rank::Unranked {
            outcome.unranked_filtered += 1;
            continue;
        }
        outcome.records.push(record.clone());
    }
    tracing::debug!(
        unified = outcome.records.len(),
        unranked_filtered = outcome.unranked_filtered,
        "unified normalized record sets"
    );
    outcome
}
