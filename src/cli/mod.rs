pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "herbarium",
    version,
    about = "Cross-authority reconciliation of botanical taxon tables",
    long_about = "Herbarium unifies taxon dumps from the World Flora Online, the GBIF \
                  backbone, and a regional flat checklist into one canonical table, \
                  deduplicating infraspecific treatments, imputing missing hierarchy \
                  fields, and emitting per-authority identifier crosswalks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full reconciliation pipeline and write all outputs
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Run the pipeline and quality checks as a promotion gate
    Check(commands::check::CheckArgs),
}
