use crate::model::{Hierarchy, NomenclaturalStatus, Rank, TaxonomicStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Origin authority of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    Wfo,
    Gbif,
    Wiz,
}

impl Authority {
    pub fn tag(&self) -> &'static str {
        match self {
            Authority::Wfo => "wfo",
            Authority::Gbif => "gbif",
            Authority::Wiz => "wiz",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Identifier scheme an external id belongs to. Authorities contribute
/// their own ids; IPNI and TPL ids ride along on WFO records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    Wfo,
    Gbif,
    Wiz,
    Ipni,
    Tpl,
}

impl IdScheme {
    pub fn tag(&self) -> &'static str {
        match self {
            IdScheme::Wfo => "wfo",
            IdScheme::Gbif => "gbif",
            IdScheme::Wiz => "wiz",
            IdScheme::Ipni => "ipni",
            IdScheme::Tpl => "tpl",
        }
    }
}

impl From<Authority> for IdScheme {
    fn from(authority: Authority) -> Self {
        match authority {
            Authority::Wfo => IdScheme::Wfo,
            Authority::Gbif => IdScheme::Gbif,
            Authority::Wiz => IdScheme::Wiz,
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExternalId {
    pub scheme: IdScheme,
    pub id: String,
}

impl ExternalId {
    pub fn new(scheme: IdScheme, id: impl Into<String>) -> Self {
        Self { scheme, id: id.into() }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.id)
    }
}

/// A single per-source record after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub source_id: String,
    pub parent_id: Option<String>,
    pub accepted_id: Option<String>,
    pub original_id: Option<String>,
    pub name: String,
    pub generic_name: Option<String>,
    pub specific_name: Option<String>,
    pub infra_name: Option<String>,
    pub hierarchy: Hierarchy,
    pub rank: Rank,
    pub taxonomic_status: TaxonomicStatus,
    pub nomenclatural_status: Option<NomenclaturalStatus>,
    pub ipni_id: Option<String>,
    pub tpl_id: Option<String>,
    pub data_source: Authority,
}

impl TaxonRecord {
    /// Every external identifier this record contributes: its own
    /// source id plus any cross-reference ids it carries.
    pub fn external_ids(&self) -> Vec<ExternalId> {
        let mut ids = vec![ExternalId::new(self.data_source.into(), self.source_id.clone())];
        if let Some(ipni) = &self.ipni_id {
            ids.push(ExternalId::new(IdScheme::Ipni, ipni.clone()));
        }
        if let Some(tpl) = &self.tpl_id {
            ids.push(ExternalId::new(IdScheme::Tpl, tpl.clone()));
        }
        ids
    }

    /// Dedup key: a record is a merge candidate only when all three
    /// epithets are present.
    pub fn dedup_key(&self) -> Option<(String, String, String)> {
        match (&self.generic_name, &self.specific_name, &self.infra_name) {
            (Some(g), Some(s), Some(i)) => Some((g.clone(), s.clone(), i.clone())),
            _ => None,
        }
    }
}

/// One reconciled taxon across all contributing authorities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTaxon {
    pub id: u64,
    pub name: String,
    pub rank: Rank,
    pub generic_name: Option<String>,
    pub specific_name: Option<String>,
    pub infra_name: Option<String>,
    pub hierarchy: Hierarchy,
    pub external_ids: BTreeSet<ExternalId>,
    pub data_sources: BTreeSet<Authority>,
}

impl CanonicalTaxon {
    /// Join key used by the CrosswalkBuilder.
    pub fn match_key(&self) -> (Rank, Option<&str>, Option<&str>, Option<&str>) {
        (
            self.rank,
            self.generic_name.as_deref(),
            self.specific_name.as_deref(),
            self.infra_name.as_deref(),
        )
    }
}
