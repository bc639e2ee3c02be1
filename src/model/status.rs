use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomicStatus {
    Accepted,
    Synonym,
    Invalid,
    Unresolved,
    Misapplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NomenclaturalStatus {
    Legitimate,
    Illegitimate,
    Superfluous,
    Rejected,
    Invalid,
}

impl fmt::Display for TaxonomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaxonomicStatus::Accepted => "accepted",
            TaxonomicStatus::Synonym => "synonym",
            TaxonomicStatus::Invalid => "invalid",
            TaxonomicStatus::Unresolved => "unresolved",
            TaxonomicStatus::Misapplied => "misapplied",
        };
        f.write_str(s)
    }
}

impl fmt::Display for NomenclaturalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NomenclaturalStatus::Legitimate => "legitimate",
            NomenclaturalStatus::Illegitimate => "illegitimate",
            NomenclaturalStatus::Superfluous => "superfluous",
            NomenclaturalStatus::Rejected => "rejected",
            NomenclaturalStatus::Invalid => "invalid",
        };
        f.write_str(s)
    }
}
