/// Flat-table I/O.
///
/// The engine's only contract with the outside world: read the raw
/// per-source tables the ingestion collaborator produced, and write
/// the canonical taxon table plus the per-authority crosswalk tables.
/// Tab-separated files (the GBIF backbone ships as TSV) are detected
/// by extension.
use crate::engine::{CrosswalkEntry, Crosswalks, ReconcileOutput};
use crate::model::{CanonicalTaxon, Rank};
use crate::report::CheckReport;
use crate::Result;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    }
}

/// Reads one raw source table into typed rows. Unparseable lines are
/// skipped with a warning rather than aborting the load; source dumps
/// routinely contain a few broken rows.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable row");
            }
        }
    }
    tracing::info!(path = %path.display(), rows = rows.len(), skipped, "loaded source table");
    Ok(rows)
}

const CANONICAL_HEADER: [&str; 19] = [
    "id",
    "name",
    "rank",
    "generic_name",
    "specific_name",
    "infra_name",
    "section",
    "subgenus",
    "genus",
    "subtribe",
    "tribe",
    "subfamily",
    "family",
    "order",
    "class",
    "phylum",
    "kingdom",
    "external_ids",
    "data_sources",
];

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

pub fn write_canonical(path: &Path, taxa: &[CanonicalTaxon]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CANONICAL_HEADER)?;
    for taxon in taxa {
        let external_ids = taxon
            .external_ids
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("|");
        let data_sources = taxon
            .data_sources
            .iter()
            .map(|s| s.tag().to_string())
            .collect::<Vec<_>>()
            .join("|");
        writer.write_record([
            taxon.id.to_string().as_str(),
            &taxon.name,
            taxon.rank.label(),
            opt(taxon.generic_name.as_deref()),
            opt(taxon.specific_name.as_deref()),
            opt(taxon.infra_name.as_deref()),
            opt(taxon.hierarchy.get(Rank::Section)),
            opt(taxon.hierarchy.get(Rank::Subgenus)),
            opt(taxon.hierarchy.get(Rank::Genus)),
            opt(taxon.hierarchy.get(Rank::Subtribe)),
            opt(taxon.hierarchy.get(Rank::Tribe)),
            opt(taxon.hierarchy.get(Rank::Subfamily)),
            opt(taxon.hierarchy.get(Rank::Family)),
            opt(taxon.hierarchy.get(Rank::Order)),
            opt(taxon.hierarchy.get(Rank::Class)),
            opt(taxon.hierarchy.get(Rank::Phylum)),
            opt(taxon.hierarchy.get(Rank::Kingdom)),
            &external_ids,
            &data_sources,
        ])?;
    }
    writer.flush().map_err(crate::HerbariumError::Io)?;
    Ok(())
}

fn write_crosswalk(path: &Path, entries: &[CrosswalkEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["canonical_id", "external_id"])?;
    for entry in entries {
        writer.write_record([entry.canonical_id.to_string().as_str(), &entry.external_id])?;
    }
    writer.flush().map_err(crate::HerbariumError::Io)?;
    Ok(())
}

pub fn write_crosswalks(dir: &Path, crosswalks: &Crosswalks) -> Result<()> {
    write_crosswalk(&dir.join("crosswalk_wfo.csv"), &crosswalks.wfo)?;
    write_crosswalk(&dir.join("crosswalk_gbif.csv"), &crosswalks.gbif)?;
    write_crosswalk(&dir.join("crosswalk_wiz.csv"), &crosswalks.wiz)?;
    write_crosswalk(&dir.join("crosswalk_ipni.csv"), &crosswalks.ipni)?;
    write_crosswalk(&dir.join("crosswalk_tpl.csv"), &crosswalks.tpl)?;
    Ok(())
}

pub fn write_check_report(path: &Path, report: &CheckReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| crate::HerbariumError::Other(e.to_string()))?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Writes every output of a run into one directory.
pub fn write_outputs(dir: &Path, output: &ReconcileOutput, report: &CheckReport) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_canonical(&dir.join("canonical_taxa.csv"), &output.taxa)?;
    write_crosswalks(dir, &output.crosswalks)?;
    write_check_report(&dir.join("checks.json"), report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::wfo::WfoRow;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_comma_separated_rows() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "taxonID,scientificName,taxonRank,taxonomicStatus").unwrap();
        writeln!(file, "wfo-1,Drosera regia,species,Accepted").unwrap();
        file.flush().unwrap();

        let rows: Vec<WfoRow> = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].taxon_id, "wfo-1");
        assert_eq!(rows[0].scientific_name.as_deref(), Some("Drosera regia"));
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(file, "taxonID\tscientificName\ttaxonRank").unwrap();
        writeln!(file, "wfo-2\tDrosera capensis\tspecies").unwrap();
        file.flush().unwrap();

        let rows: Vec<WfoRow> = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].taxon_id, "wfo-2");
    }
}
