use super::{run_pipeline, InputArgs};
use crate::report::{render_checks, run_checks};
use crate::tables;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the machine-readable check report here as well
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Promotion gate: rebuilds the canonical table in memory and fails
/// the process when any quality check fails.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let (output, rules) = run_pipeline(&args.input)?;
    let report = run_checks(&output, &rules);

    if let Some(path) = &args.report {
        tables::write_check_report(path, &report)?;
    }

    println!("{}", render_checks(&report));

    if !report.all_passed() {
        let failed: Vec<&str> = report.failed().map(|c| c.name.as_str()).collect();
        anyhow::bail!("{} check(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}
