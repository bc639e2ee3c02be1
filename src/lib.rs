pub mod cli;
pub mod engine;
pub mod model;
pub mod parser;
pub mod report;
pub mod rules;
pub mod sources;
pub mod tables;
pub mod utils;

pub use crate::engine::Reconciler;
pub use crate::rules::RuleSet;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HerbariumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    #[error("Invalid rule set: {0}")]
    Rules(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HerbariumError>;
