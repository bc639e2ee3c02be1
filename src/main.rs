use clap::Parser;
use colored::*;
use herbarium::cli::{Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging with HERBARIUM_LOG environment variable support
    let log_level = std::env::var("HERBARIUM_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<herbarium::HerbariumError>() {
            Some(herbarium::HerbariumError::Rules(_)) => 2,
            Some(herbarium::HerbariumError::Io(_)) => 3,
            Some(herbarium::HerbariumError::Parse(_)) => 4,
            Some(herbarium::HerbariumError::Table(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    herbarium::utils::configure_thread_pool(cli.threads)?;

    if cli.verbose > 0 {
        eprintln!("Using {} threads", rayon::current_num_threads());
    }

    match cli.command {
        Commands::Reconcile(args) => herbarium::cli::commands::reconcile::run(args),
        Commands::Check(args) => herbarium::cli::commands::check::run(args),
    }
}
