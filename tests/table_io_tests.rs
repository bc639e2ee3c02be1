/// Tests for flat-table input and output
///
/// Covers reading the raw source tables from CSV and TSV, writing the
/// canonical and crosswalk tables, and the JSON check report.
use herbarium::engine::{Reconciler, SourceTables};
use herbarium::report::run_checks;
use herbarium::rules::RuleSet;
use herbarium::tables;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn load_fixture(dir: &Path) -> SourceTables {
    let wfo = write_file(
        dir,
        "wfo.csv",
        "taxonID,scientificName,taxonRank,taxonomicStatus,family,genus\n\
         wfo-001,Drosera regia,species,Accepted,Droseraceae,Drosera\n\
         wfo-002,Drosera capensis var. alba,variety,Accepted,Droseraceae,Drosera\n",
    );
    // The backbone ships tab-separated.
    let gbif = write_file(
        dir,
        "gbif.tsv",
        "taxonID\tcanonicalName\ttaxonRank\ttaxonomicStatus\tkingdom\tfamily\tgenus\torder\n\
         100\tDrosera aliciae\tspecies\taccepted\tPlantae\tDroseraceae\tDrosera\tCaryophyllales\n\
         101\tVibrio cholerae\tspecies\taccepted\tBacteria\tVibrionaceae\tVibrio\tVibrionales\n",
    );
    let wiz_species = write_file(dir, "species.csv", "id,name\nws1,Drosera capensis\n");
    let wiz_infras = write_file(
        dir,
        "infras.csv",
        "id,name\nwi1,Drosera capensis ssp. alba\n",
    );

    SourceTables {
        wfo: tables::read_rows(&wfo).unwrap(),
        gbif: tables::read_rows(&gbif).unwrap(),
        wiz_species: tables::read_rows(&wiz_species).unwrap(),
        wiz_infras: tables::read_rows(&wiz_infras).unwrap(),
    }
}

#[test]
fn reads_csv_and_tsv_source_tables() {
    let dir = TempDir::new().unwrap();
    let tables = load_fixture(dir.path());

    assert_eq!(tables.wfo.len(), 2);
    assert_eq!(tables.gbif.len(), 2);
    assert_eq!(tables.wiz_species.len(), 1);
    assert_eq!(tables.wiz_infras.len(), 1);
    assert_eq!(tables.gbif[0].canonical_name.as_deref(), Some("Drosera aliciae"));
}

#[test]
fn writes_all_outputs_of_a_run() {
    let dir = TempDir::new().unwrap();
    let tables = load_fixture(dir.path());

    let rules = RuleSet::default();
    let output = Reconciler::new(rules.clone()).run(tables).unwrap();
    let report = run_checks(&output, &rules);

    let out_dir = dir.path().join("out");
    tables::write_outputs(&out_dir, &output, &report).unwrap();

    let canonical = std::fs::read_to_string(out_dir.join("canonical_taxa.csv")).unwrap();
    let mut lines = canonical.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("id,name,rank,"));
    assert!(header.ends_with("external_ids,data_sources"));
    assert_eq!(lines.count(), output.taxa.len());
    // With a single source per treatment the subspecies-first rank
    // preference decides the merge.
    assert!(canonical.contains("Drosera capensis ssp. alba"));
    assert!(canonical.contains("wfo:wfo-002"));

    for name in [
        "crosswalk_wfo.csv",
        "crosswalk_gbif.csv",
        "crosswalk_wiz.csv",
        "crosswalk_ipni.csv",
        "crosswalk_tpl.csv",
    ] {
        assert!(out_dir.join(name).is_file(), "missing {name}");
    }

    let checks: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("checks.json")).unwrap())
            .unwrap();
    assert!(checks["checks"].as_array().unwrap().len() >= 8);
}

#[test]
fn merged_taxon_row_carries_union_of_ids() {
    let dir = TempDir::new().unwrap();
    let tables = load_fixture(dir.path());

    let rules = RuleSet::default();
    let output = Reconciler::new(rules).run(tables).unwrap();

    let out_dir = dir.path().join("out");
    std::fs::create_dir_all(&out_dir).unwrap();
    tables::write_canonical(&out_dir.join("canonical_taxa.csv"), &output.taxa).unwrap();

    let canonical = std::fs::read_to_string(out_dir.join("canonical_taxa.csv")).unwrap();
    let merged_row = canonical
        .lines()
        .find(|l| l.contains("Drosera capensis ssp. alba"))
        .unwrap();
    assert!(merged_row.contains("wfo:wfo-002|wiz:wiz:wi1"));
    assert!(merged_row.contains("wfo|wiz"));
}
