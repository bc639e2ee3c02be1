pub mod checks;
pub mod text;

pub use checks::{run_checks, CheckOutcome, CheckReport};
pub use text::{render_checks, render_stats};
