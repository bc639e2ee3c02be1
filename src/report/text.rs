/// Plain-text rendering of run statistics and check reports.
use crate::engine::RunStats;
use crate::report::checks::CheckReport;
use colored::Colorize;
use std::fmt::Write;

pub fn render_stats(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run summary");
    let _ = writeln!(out, "===========");
    let _ = writeln!(
        out,
        "  WFO:  {} records ({} dropped)",
        stats.wfo_records, stats.wfo_dropped
    );
    let _ = writeln!(
        out,
        "  GBIF: {} records ({} dropped, {} filtered)",
        stats.gbif_records, stats.gbif_dropped, stats.gbif_filtered
    );
    let _ = writeln!(
        out,
        "  WIZ:  {} records ({} dropped)",
        stats.wiz_records, stats.wiz_dropped
    );
    let _ = writeln!(
        out,
        "  Unified: {} records ({} unranked excluded)",
        stats.unified_records, stats.unranked_filtered
    );
    let _ = writeln!(
        out,
        "  Merged:  {} duplicate groups ({} records absorbed)",
        stats.merged_groups, stats.merged_records
    );
    let _ = writeln!(
        out,
        "  Canonical taxa: {} ({} hierarchy fields imputed)",
        stats.canonical_taxa, stats.filled_fields
    );
    if !stats.rank_counts.is_empty() {
        let by_rank: Vec<String> = stats
            .rank_counts
            .iter()
            .map(|(rank, count)| format!("{rank} {count}"))
            .collect();
        let _ = writeln!(out, "  By rank:   {}", by_rank.join(", "));
    }
    if !stats.status_counts.is_empty() {
        let by_status: Vec<String> = stats
            .status_counts
            .iter()
            .map(|(status, count)| format!("{status} {count}"))
            .collect();
        let _ = writeln!(out, "  By status: {}", by_status.join(", "));
    }
    out
}

pub fn render_checks(report: &CheckReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quality checks");
    let _ = writeln!(out, "==============");
    for check in &report.checks {
        let status = if check.passed {
            "PASS".green()
        } else {
            "FAIL".red().bold()
        };
        let _ = writeln!(out, "  [{}] {}: {}", status, check.name, check.detail);
    }
    let verdict = if report.all_passed() {
        "all checks passed".green().to_string()
    } else {
        format!(
            "{} check(s) failed; output should not be promoted",
            report.failed().count()
        )
        .red()
        .to_string()
    };
    let _ = writeln!(out, "  {}", verdict);
    out
}
