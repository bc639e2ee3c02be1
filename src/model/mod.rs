pub mod hierarchy;
pub mod rank;
pub mod record;
pub mod status;

pub use hierarchy::Hierarchy;
pub use rank::Rank;
pub use record::{Authority, CanonicalTaxon, ExternalId, IdScheme, TaxonRecord};
pub use status::{NomenclaturalStatus, TaxonomicStatus};
