//! End-to-end tests of the preset-index binary against the embedded catalog

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn preset_index() -> Command {
    Command::cargo_bin("preset-index").unwrap()
}

#[test]
fn test_match_prints_best_preset() {
    preset_index()
        .args(["match", "-g", "point", "amenity=cafe", "name=Dolce"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preset: Cafe (amenity/cafe)"));
}

#[test]
fn test_match_untagged_falls_back() {
    preset_index()
        .args(["match", "-g", "line"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(line)"))
        .stdout(predicate::str::contains("fallback"));
}

#[test]
fn test_match_json_output() {
    let output = preset_index()
        .args(["--format", "json", "match", "-g", "area", "leisure=park"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], "leisure/park");
    assert_eq!(value["source"], "scored");
}

#[test]
fn test_invalid_tag_is_rejected() {
    preset_index()
        .args(["match", "amenity"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected key=value"));
}

#[test]
fn test_is_area() {
    preset_index()
        .args(["classify", "is-area", "leisure=park"])
        .assert()
        .success()
        .stdout("true\n");

    preset_index()
        .args(["classify", "is-area", "highway=residential"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_defaults_for_area() {
    preset_index()
        .args(["--format", "tsv", "defaults", "-g", "area", "-n", "3"])
        .assert()
        .success()
        .stdout("rank\tid\tname\n1\tbuilding/house\tHouse\n2\tleisure/park\tPark\n3\tarea\tArea\n");
}

#[test]
fn test_recents_persist_between_runs() {
    let dir = TempDir::new().unwrap();
    let ledger = dir.path().join("recents.json");
    let ledger = ledger.to_str().unwrap();

    preset_index()
        .args(["--recents", ledger, "recents", "add", "shop/bakery"])
        .assert()
        .success();
    preset_index()
        .args(["--recents", ledger, "recents", "add", "amenity/cafe"])
        .assert()
        .success();

    preset_index()
        .args(["--recents", ledger, "--format", "tsv", "recents", "list"])
        .assert()
        .success()
        .stdout("rank\tid\tgeometry\n1\tamenity/cafe\tpoint\n2\tshop/bakery\tpoint\n");

    // recents lead the defaults list, and the fallback closes it
    preset_index()
        .args(["--recents", ledger, "--format", "tsv", "defaults", "-n", "3"])
        .assert()
        .success()
        .stdout("rank\tid\tname\n1\tamenity/cafe\tCafe\n2\tshop/bakery\tBakery\n3\tpoint\tPoint\n");

    // intro mode hides them
    preset_index()
        .args(["--recents", ledger, "--intro", "--format", "tsv", "defaults", "-n", "3"])
        .assert()
        .success()
        .stdout(
            "rank\tid\tname\n1\tamenity/cafe\tCafe\n2\tamenity/restaurant\tRestaurant\n3\tpoint\tPoint\n",
        );
}

#[test]
fn test_recents_move_requires_both_items() {
    let dir = TempDir::new().unwrap();
    let ledger = dir.path().join("recents.json");
    let ledger = ledger.to_str().unwrap();

    preset_index()
        .args(["--recents", ledger, "recents", "add", "shop/bakery"])
        .assert()
        .success();

    preset_index()
        .args([
            "--recents",
            ledger,
            "recents",
            "move",
            "shop/bakery",
            "--before",
            "amenity/cafe",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot move"));
}

#[test]
fn test_catalog_show_category() {
    preset_index()
        .args(["catalog", "show", "category-building"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category:"));
}

#[test]
fn test_catalog_show_unknown_preset() {
    preset_index()
        .args(["catalog", "show", "amenity/nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_catalog_export_is_loadable() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("catalog.json");

    preset_index()
        .args(["catalog", "export", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    let contents = std::fs::read_to_string(&output).unwrap();
    let catalog = preset_index::PresetCatalog::from_json(&contents).unwrap();
    assert!(catalog.get(&preset_index::PresetId::new("amenity/cafe")).is_some());
}

#[test]
fn test_data_directory_replaces_embedded_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("preset_presets.json"),
        r#"{"natural/tree": {"name": "Tree", "geometry": ["point"], "tags": {"natural": "tree"}}}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("preset_fields.json"), "{}").unwrap();
    std::fs::write(dir.path().join("preset_categories.json"), "{}").unwrap();
    std::fs::write(dir.path().join("preset_defaults.json"), "{}").unwrap();

    preset_index()
        .args(["--data", dir.path().to_str().unwrap(), "match", "natural=tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("natural/tree"));

    preset_index()
        .args(["--data", dir.path().to_str().unwrap(), "match", "amenity=cafe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(point)"));
}

#[test]
fn test_missing_data_directory_fails() {
    let dir = TempDir::new().unwrap();
    preset_index()
        .args(["--data", dir.path().to_str().unwrap(), "match", "amenity=cafe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load catalog"));
}
