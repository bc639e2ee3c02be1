/// Post-run quality checks.
///
/// Every check is independent and reported, never fatal: a failure
/// blocks promotion of the run's output to trusted, not the run
/// itself. Each outcome carries the check name, pass/fail, and a
/// human-readable detail naming the first few offenders.
use crate::engine::ReconcileOutput;
use crate::model::{ExternalId, Rank, TaxonRecord};
use crate::rules::RuleSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const DETAIL_SAMPLE: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub generated_at: DateTime<Utc>,
    pub checks: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

fn sample(items: &[String]) -> String {
    let shown: Vec<&str> = items.iter().take(DETAIL_SAMPLE).map(String::as_str).collect();
    if items.len() > DETAIL_SAMPLE {
        format!("{} ... and {} more", shown.join(", "), items.len() - DETAIL_SAMPLE)
    } else {
        shown.join(", ")
    }
}

/// Every record that entered the Deduplicator must be reachable from
/// some canonical taxon's external ids. Unranked records are excluded:
/// the union stage filtered them by design.
fn check_no_loss(output: &ReconcileOutput) -> CheckOutcome {
    let known: HashSet<&ExternalId> = output
        .taxa
        .iter()
        .flat_map(|t| t.external_ids.iter())
        .collect();

    let mut missing = Vec::new();
    for record in output.normalized.all_records() {
        if record.rank == Rank::Unranked {
            continue;
        }
        let id = ExternalId::new(record.data_source.into(), record.source_id.clone());
        if !known.contains(&id) {
            missing.push(record.source_id.clone());
        }
    }

    if missing.is_empty() {
        CheckOutcome::pass("no_loss", "every source record is represented")
    } else {
        CheckOutcome::fail(
            "no_loss",
            format!("{} source records unrepresented: {}", missing.len(), sample(&missing)),
        )
    }
}

/// Re-grouping the canonical set by the dedup key must find no group
/// with more than one member.
fn check_dedup_idempotent(output: &ReconcileOutput) -> CheckOutcome {
    let mut counts: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for taxon in &output.taxa {
        if let (Some(g), Some(s), Some(i)) = (
            taxon.generic_name.as_deref(),
            taxon.specific_name.as_deref(),
            taxon.infra_name.as_deref(),
        ) {
            *counts.entry((g, s, i)).or_insert(0) += 1;
        }
    }
    let duplicates: Vec<String> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|((g, s, i), count)| format!("{g} {s} {i} ({count})"))
        .collect();

    if duplicates.is_empty() {
        CheckOutcome::pass("dedup_idempotent", "no residual duplicate groups")
    } else {
        CheckOutcome::fail(
            "dedup_idempotent",
            format!("{} residual groups: {}", duplicates.len(), sample(&duplicates)),
        )
    }
}

/// No canonical taxon may carry a hierarchy value at a rank deeper than
/// its own.
fn check_rank_order(output: &ReconcileOutput) -> CheckOutcome {
    let mut offenders = Vec::new();
    for taxon in &output.taxa {
        let below = taxon.hierarchy.populated_below(taxon.rank);
        if !below.is_empty() {
            let ranks: Vec<&str> = below.iter().map(|r| r.label()).collect();
            offenders.push(format!("{} ({}): {}", taxon.name, taxon.rank, ranks.join("/")));
        }
    }
    if offenders.is_empty() {
        CheckOutcome::pass("rank_order", "hierarchy fields respect rank depth")
    } else {
        CheckOutcome::fail(
            "rank_order",
            format!("{} taxa violate rank depth: {}", offenders.len(), sample(&offenders)),
        )
    }
}

fn check_no_self_reference(output: &ReconcileOutput) -> CheckOutcome {
    let mut offenders = Vec::new();
    for record in output.normalized.all_records() {
        let own = Some(record.source_id.as_str());
        if record.parent_id.as_deref() == own
            || record.accepted_id.as_deref() == own
            || record.original_id.as_deref() == own
        {
            offenders.push(record.source_id.clone());
        }
    }
    if offenders.is_empty() {
        CheckOutcome::pass("no_self_reference", "no record references itself")
    } else {
        CheckOutcome::fail(
            "no_self_reference",
            format!("{} self-referencing records: {}", offenders.len(), sample(&offenders)),
        )
    }
}

fn component_is_malformed(component: &str) -> bool {
    component.is_empty()
        || component.chars().any(|c| c.is_ascii_digit())
        || component.chars().any(char::is_whitespace)
}

/// Name components must be single words without digits.
fn check_name_shape(output: &ReconcileOutput) -> CheckOutcome {
    let mut offenders = Vec::new();
    for record in output.normalized.all_records() {
        let bad = [
            record.generic_name.as_deref(),
            record.specific_name.as_deref(),
            record.infra_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(component_is_malformed);
        if bad {
            offenders.push(format!("{} ({})", record.name, record.source_id));
        }
    }
    if offenders.is_empty() {
        CheckOutcome::pass("name_shape", "all name components are clean single words")
    } else {
        CheckOutcome::fail(
            "name_shape",
            format!("{} malformed components: {}", offenders.len(), sample(&offenders)),
        )
    }
}

/// Lowercase abbreviation tokens in display names must come from the
/// marker table; anything else is an unsupported abbreviation that the
/// rule table does not know how to canonicalize.
fn check_marker_support(output: &ReconcileOutput, rules: &RuleSet) -> CheckOutcome {
    // Rank annotations legitimately appear in higher-rank display
    // names ("Drosera sect. Bryastrum") and are not epithet markers.
    const ANNOTATIONS: [&str; 3] = ["subg.", "subgen.", "sect."];

    let mut offenders = Vec::new();
    for record in output.normalized.all_records() {
        for token in record.name.split_whitespace() {
            let is_abbrev = token.ends_with('.')
                && token.chars().next().map(|c| c.is_lowercase()).unwrap_or(false);
            if is_abbrev
                && !ANNOTATIONS.contains(&token)
                && rules.marker_for_spelling(token).is_none()
            {
                offenders.push(format!("'{}' in {}", token, record.name));
            }
        }
    }
    if offenders.is_empty() {
        CheckOutcome::pass("marker_support", "all abbreviations are known markers")
    } else {
        CheckOutcome::fail(
            "marker_support",
            format!(
                "{} unsupported abbreviations: {}",
                offenders.len(),
                sample(&offenders)
            ),
        )
    }
}

/// Parent links must point at an existing record whose rank is a valid
/// parent rank for the child.
fn check_parent_links(output: &ReconcileOutput, rules: &RuleSet) -> CheckOutcome {
    let by_id: HashMap<&str, &TaxonRecord> = output
        .normalized
        .all_records()
        .map(|r| (r.source_id.as_str(), r))
        .collect();

    let mut dangling = Vec::new();
    let mut invalid = Vec::new();
    for record in output.normalized.all_records() {
        let Some(parent_id) = record.parent_id.as_deref() else {
            continue;
        };
        match by_id.get(parent_id) {
            None => dangling.push(format!("{} -> {}", record.source_id, parent_id)),
            Some(parent) => {
                if parent.rank != Rank::Unranked
                    && record.rank != Rank::Unranked
                    && !rules.is_valid_transition(parent.rank, record.rank)
                {
                    invalid.push(format!(
                        "{} ({}) under {} ({})",
                        record.name, record.rank, parent.name, parent.rank
                    ));
                }
            }
        }
    }

    if dangling.is_empty() && invalid.is_empty() {
        CheckOutcome::pass("parent_links", "all parent links resolve with valid rank transitions")
    } else {
        CheckOutcome::fail(
            "parent_links",
            format!(
                "{} dangling ({}); {} invalid transitions ({})",
                dangling.len(),
                sample(&dangling),
                invalid.len(),
                sample(&invalid)
            ),
        )
    }
}

/// The crosswalk audit: every normalized record should have joined back
/// to a canonical taxon.
fn check_crosswalk_coverage(output: &ReconcileOutput) -> CheckOutcome {
    if output.crosswalks.unmatched.is_empty() {
        CheckOutcome::pass("crosswalk_coverage", "every source record joined a canonical taxon")
    } else {
        CheckOutcome::fail(
            "crosswalk_coverage",
            format!(
                "{} source records without a crosswalk row: {}",
                output.crosswalks.unmatched.len(),
                sample(&output.crosswalks.unmatched)
            ),
        )
    }
}

pub fn run_checks(output: &ReconcileOutput, rules: &RuleSet) -> CheckReport {
    let checks = vec![
        check_no_loss(output),
        check_dedup_idempotent(output),
        check_rank_order(output),
        check_no_self_reference(output),
        check_name_shape(output),
        check_marker_support(output, rules),
        check_parent_links(output, rules),
        check_crosswalk_coverage(output),
    ];
    for check in &checks {
        if check.passed {
            tracing::debug!(check = %check.name, "check passed");
        } else {
            tracing::warn!(check = %check.name, detail = %check.detail, "check failed");
        }
    }
    CheckReport {
        generated_at: Utc::now(),
        checks,
    }
}
