pub mod name;

pub use name::{parse_name, ParsedName};
