/// Bottom-up hierarchy imputation.
///
/// Two explicit phases over the deduplicated set: first compute, for
/// every grouping rank from genus up to kingdom, the most frequent
/// non-null value of every less-specific field among taxa sharing that
/// grouping value; then fill each taxon's missing fields from the mode
/// at the nearest available grouping key. A field that is already
/// present is never overwritten, and group keys are read from the
/// pre-fill snapshot, so imputed values never cascade into further
/// imputation within the same run.
///
/// Ties between equally frequent candidate values are broken by taking
/// the lexicographically smallest, which keeps the result reproducible
/// across runs and platforms.
use crate::model::{CanonicalTaxon, Rank};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Grouping ranks, most specific first. The position in this list is
/// also the fill preference order: genus-level modes win over modes
/// computed at broader keys.
pub const GROUPING_ORDER: [Rank; 9] = [
    Rank::Genus,
    Rank::Subtribe,
    Rank::Tribe,
    Rank::Subfamily,
    Rank::Family,
    Rank::Order,
    Rank::Class,
    Rank::Phylum,
    Rank::Kingdom,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FillOutcome {
    pub filled_fields: usize,
}

/// Fields the filler may impute when grouping by `grouping`: every rank
/// in the chain that is less specific than the grouping key.
fn targets_for(grouping: Rank) -> impl Iterator<Item = Rank> {
    GROUPING_ORDER.into_iter().filter(move |r| *r < grouping)
}

type ModeKey = (Rank, String, Rank);

fn compute_modes(taxa: &[CanonicalTaxon]) -> HashMap<ModeKey, String> {
    // BTreeMap keeps candidate values sorted, so the first value with
    // the maximal count is the lexicographic tie-break winner.
    let mut counts: HashMap<ModeKey, BTreeMap<String, usize>> = HashMap::new();
    for taxon in taxa {
        for grouping in GROUPING_ORDER {
            let Some(group_value) = taxon.hierarchy.get(grouping) else {
                continue;
            };
            for target in targets_for(grouping) {
                if let Some(value) = taxon.hierarchy.get(target) {
                    *counts
                        .entry((grouping, group_value.to_string(), target))
                        .or_default()
                        .entry(value.to_string())
                        .or_insert(0) += 1;
                }
            }
        }
    }

    counts
        .into_iter()
        .filter_map(|(key, candidates)| {
            let mut best: Option<(&String, usize)> = None;
            for (value, count) in &candidates {
                if best.map(|(_, c)| *count > c).unwrap_or(true) {
                    best = Some((value, *count));
                }
            }
            best.map(|(value, _)| (key, value.clone()))
        })
        .collect()
}

fn fill_one(taxon: &mut CanonicalTaxon, modes: &HashMap<ModeKey, String>) -> usize {
    let snapshot = taxon.hierarchy.clone();
    let mut filled = 0;
    for target in GROUPING_ORDER {
        if snapshot.get(target).is_some() {
            continue;
        }
        // Nearest grouping key wins: genus first, then upward.
        for grouping in GROUPING_ORDER {
            if grouping <= target {
                continue;
            }
            let Some(group_value) = snapshot.get(grouping) else {
                continue;
            };
            if let Some(mode) = modes.get(&(grouping, group_value.to_string(), target)) {
                taxon.hierarchy.set(target, Some(mode.clone()));
                filled += 1;
                break;
            }
        }
    }
    filled
}

pub fn fill_hierarchy(taxa: &mut [CanonicalTaxon]) -> FillOutcome {
    let modes = compute_modes(taxa);
    let filled_fields = taxa
        .par_iter_mut()
        .map(|taxon| fill_one(taxon, &modes))
        .sum();
    tracing::debug!(filled_fields, "imputed missing hierarchy fields");
    FillOutcome { filled_fields }
}
