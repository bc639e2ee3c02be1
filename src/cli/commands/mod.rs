pub mod check;
pub mod reconcile;

use crate::engine::{ReconcileOutput, Reconciler, SourceTables};
use crate::rules::RuleSet;
use crate::tables;
use clap::Args;
use std::path::PathBuf;

/// Input table locations shared by every subcommand.
#[derive(Args)]
pub struct InputArgs {
    /// WFO Darwin Core taxon table (CSV, or TSV by extension)
    #[arg(long, value_name = "FILE")]
    pub wfo: PathBuf,

    /// GBIF backbone taxon table
    #[arg(long, value_name = "FILE")]
    pub gbif: PathBuf,

    /// Regional checklist species table
    #[arg(long, value_name = "FILE")]
    pub wiz_species: PathBuf,

    /// Regional checklist infraspecific table
    #[arg(long, value_name = "FILE")]
    pub wiz_infras: PathBuf,

    /// Rule set overriding the built-in markers and aliases (TOML)
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

/// Loads the raw tables and runs the pipeline end to end.
pub fn run_pipeline(input: &InputArgs) -> anyhow::Result<(ReconcileOutput, RuleSet)> {
    let rules = match &input.rules {
        Some(path) => RuleSet::from_path(path)?,
        None => RuleSet::default(),
    };
    rules.validate()?;

    let tables = SourceTables {
        wfo: tables::read_rows(&input.wfo)?,
        gbif: tables::read_rows(&input.gbif)?,
        wiz_species: tables::read_rows(&input.wiz_species)?,
        wiz_infras: tables::read_rows(&input.wiz_infras)?,
    };

    let reconciler = Reconciler::new(rules.clone());
    let output = reconciler.run(tables)?;
    Ok((output, rules))
}
