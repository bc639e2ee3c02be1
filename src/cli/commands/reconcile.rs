use super::{run_pipeline, InputArgs};
use crate::report::{render_checks, render_stats, run_checks};
use crate::tables;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory to write the canonical table, crosswalks, and check report
    #[arg(short, long, value_name = "DIR", default_value = "reconciled")]
    pub output: PathBuf,
}

pub fn run(args: ReconcileArgs) -> anyhow::Result<()> {
    let (output, rules) = run_pipeline(&args.input)?;
    let report = run_checks(&output, &rules);

    tables::write_outputs(&args.output, &output, &report)?;

    println!("{}", render_stats(&output.stats));
    println!("{}", render_checks(&report));
    println!("Outputs written to {}", args.output.display());

    // Failing checks are diagnostics here; the check subcommand is the
    // gate that turns them into a nonzero exit.
    Ok(())
}
