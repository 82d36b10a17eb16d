//! Integration tests for the costsim CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get a costsim command isolated from the user's environment
fn costsim(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("costsim").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg"))
        .env("HOME", dir)
        .env_remove("COSTSIM_API_BASE")
        .env_remove("COSTSIM_CURRENCY")
        .env_remove("COSTSIM_CATALOG")
        .env_remove("COSTSIM_SCENARIO")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a workspace seeded with the sample scenario
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    costsim(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run `show -f json` and parse the result set
fn results(dir: &Path) -> Value {
    let output = costsim(dir).args(["show", "-f", "json"]).output().unwrap();
    assert!(output.status.success(), "show failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

fn number(v: &Value, key: &str) -> f64 {
    v[key]
        .as_f64()
        .unwrap_or_else(|| panic!("{} is not a number in {}", key, v))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn scenario_file(dir: &Path) -> std::path::PathBuf {
    dir.join(".costsim").join("scenario.json")
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();

    costsim(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized costsim workspace"));

    assert!(tmp.path().join(".costsim").is_dir());
    assert!(tmp.path().join(".costsim/config.yaml").is_file());
    assert!(scenario_file(tmp.path()).is_file());
}

#[test]
fn test_init_twice_keeps_scenario() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["set", "price", "20"])
        .assert()
        .success();

    costsim(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already"));

    assert_close(number(&results(tmp.path()), "netRevenue"), 1940.0);
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    costsim(tmp.path())
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("costsim init"));
}

// ============================================================================
// Show
// ============================================================================

#[test]
fn test_show_worked_example() {
    let tmp = setup_workspace();
    let r = results(tmp.path());

    assert_close(number(&r, "materialTotal"), 780.0);
    assert_close(number(&r, "operationTotal"), 550.0);
    assert_close(number(&r, "netRevenue"), 1212.5);
    assert_close(number(&r, "overhead"), 145.5);
    assert_close(number(&r, "totalCost"), 1475.5);
    assert_close(number(&r, "margin"), -263.0);
    assert!(r["breakEvenUnit"].is_number());
    assert_eq!(r["chart"].as_array().unwrap().len(), 3);
}

#[test]
fn test_show_human_output() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total cost"))
        .stdout(predicate::str::contains("1475.50 €"))
        .stdout(predicate::str::contains("Cost breakdown"));
}

#[test]
fn test_show_csv_rows() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["show", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("metric,value\n"))
        .stdout(predicate::str::contains("margin,-263.00"));
}

#[test]
fn test_show_break_even_undefined() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["set", "overhead", "100"])
        .assert()
        .success();

    assert!(results(tmp.path())["breakEvenUnit"].is_null());
    costsim(tmp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("undefined"));
}

#[test]
fn test_show_uses_configured_currency() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .arg("show")
        .env("COSTSIM_CURRENCY", "CHF")
        .assert()
        .success()
        .stdout(predicate::str::contains("1475.50 CHF"));
}

// ============================================================================
// Set
// ============================================================================

#[test]
fn test_set_numeric_fields() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["set", "price", "15,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Margin"));
    costsim(tmp.path())
        .args(["set", "discount", "0"])
        .assert()
        .success();

    let r = results(tmp.path());
    assert_close(number(&r, "netRevenue"), 1550.0);
}

#[test]
fn test_set_garbage_batch_is_floored() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["set", "batch", "abc"])
        .assert()
        .success();

    assert_close(number(&results(tmp.path()), "batchQty"), 1.0);
}

#[test]
fn test_set_selection_cascade() {
    let tmp = setup_workspace();
    for args in [
        ["set", "family", "Tôlerie"],
        ["set", "article", "ART-0001"],
        ["set", "technical", "Laser A"],
        ["set", "family", "Usinage"],
    ] {
        costsim(tmp.path()).args(args).assert().success();
    }

    let doc: Value =
        serde_json::from_str(&fs::read_to_string(scenario_file(tmp.path())).unwrap()).unwrap();
    assert_eq!(doc["family"], "Usinage");
    assert_eq!(doc["articleRef"], "");
    assert_eq!(doc["selectedTechnical"], "");
}

// ============================================================================
// Material and operation lines
// ============================================================================

#[test]
fn test_mat_add_list_rm() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["mat", "add", "--name", "Vis M6", "--qty", "4", "--unit-cost", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added material #2"));

    assert_close(number(&results(tmp.path()), "materialTotal"), 820.0);

    costsim(tmp.path())
        .args(["mat", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vis M6,4,0.10,40.00"));

    costsim(tmp.path())
        .args(["mat", "rm", "#1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acier S235"));

    assert_close(number(&results(tmp.path()), "materialTotal"), 40.0);
}

#[test]
fn test_mat_set_by_position() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["mat", "set", "1", "--qty", "1"])
        .assert()
        .success();

    assert_close(number(&results(tmp.path()), "materialTotal"), 390.0);
}

#[test]
fn test_mat_unknown_line_fails() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["mat", "rm", "#9"])
        .assert()
        .failure();
}

#[test]
fn test_op_add_subcontract() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args([
            "op",
            "add",
            "--name",
            "Peinture",
            "--type",
            "subcontract",
            "--subcontract-cost",
            "120",
            "--cadence",
            "5",
            "--rate",
            "80",
        ])
        .assert()
        .success();

    assert_close(number(&results(tmp.path()), "operationTotal"), 670.0);
}

#[test]
fn test_op_set_trg_and_crew() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["op", "set", "#1", "--trg", "50", "--crew", "2"])
        .assert()
        .success();

    // 100 / 10 h × 55 × (100 / 50) × 2
    assert_close(number(&results(tmp.path()), "operationTotal"), 2200.0);
}

#[test]
fn test_mat_csv_import() {
    let tmp = setup_workspace();
    let csv = tmp.path().join("bom.csv");
    fs::write(&csv, "name,qty,unit_cost\nTôle 2mm,1,5\nRivet,10,\"0,02\"\n").unwrap();

    costsim(tmp.path())
        .args(["mat", "import", "--replace"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 material line(s)"));

    // 100 × (1 × 5 + 10 × 0.02)
    assert_close(number(&results(tmp.path()), "materialTotal"), 520.0);
}

#[test]
fn test_mat_import_template() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["mat", "import", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("name,qty,unit_cost\n"));
}

// ============================================================================
// Export / import
// ============================================================================

#[test]
fn test_export_import_round_trip() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["set", "article", "ART-0001"])
        .assert()
        .success();
    let before = results(tmp.path());

    costsim(tmp.path())
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("simu_ART-0001.json"));
    let exported = tmp.path().join("simu_ART-0001.json");
    let doc: Value = serde_json::from_str(&fs::read_to_string(&exported).unwrap()).unwrap();
    assert!(doc["generatedAt"].is_string());
    assert_eq!(doc["batchQty"], 100.0);

    costsim(tmp.path())
        .args(["set", "price", "99"])
        .assert()
        .success();
    costsim(tmp.path())
        .arg("mat")
        .args(["rm", "1"])
        .assert()
        .success();

    costsim(tmp.path())
        .arg("import")
        .arg(&exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Materials:  1 line(s)"));

    assert_eq!(results(tmp.path()), before);
}

#[test]
fn test_export_to_stdout() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["export", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overheadPct\""));
    assert!(!tmp.path().join("simu_article.json").exists());
}

#[test]
fn test_import_partial_document() {
    let tmp = setup_workspace();
    let file = tmp.path().join("partial.json");
    fs::write(&file, r#"{"salePrice": "20", "materials": "not a list"}"#).unwrap();

    costsim(tmp.path()).arg("import").arg(&file).assert().success();

    let r = results(tmp.path());
    assert_close(number(&r, "materialTotal"), 780.0);
    assert_close(number(&r, "netRevenue"), 1940.0);
}

#[test]
fn test_import_legacy_duration() {
    let tmp = setup_workspace();
    let file = tmp.path().join("legacy.json");
    fs::write(
        &file,
        r#"{"operations": [{"name": "Pliage", "type": "Opérateur", "durationH": 0.5, "hourlyRate": 40}]}"#,
    )
    .unwrap();

    costsim(tmp.path()).arg("import").arg(&file).assert().success();

    // cadence 2/h → 50 h × 40
    assert_close(number(&results(tmp.path()), "operationTotal"), 2000.0);
}

#[test]
fn test_import_malformed_keeps_scenario() {
    let tmp = setup_workspace();
    let before = fs::read_to_string(scenario_file(tmp.path())).unwrap();

    let file = tmp.path().join("broken.json");
    fs::write(&file, "{\n  \"batchQty\": 5,\n  \"salePrice\": \n}\n").unwrap();

    costsim(tmp.path())
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid scenario file"));

    assert_eq!(fs::read_to_string(scenario_file(tmp.path())).unwrap(), before);
}

#[test]
fn test_explicit_scenario_file() {
    let tmp = setup_workspace();
    let other = TempDir::new().unwrap();
    let file = other.path().join("s.json");
    fs::write(&file, r#"{"batchQty": 10, "salePrice": 3}"#).unwrap();

    let output = costsim(tmp.path())
        .args(["show", "-f", "json", "--scenario"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());
    let r: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_close(number(&r, "netRevenue"), 30.0);
    assert_close(number(&r, "totalCost"), 0.0);
}

// ============================================================================
// ERP load
// ============================================================================

#[test]
fn test_load_requires_article() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .arg("load")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No article selected"));
}

#[test]
fn test_load_unreachable_keeps_scenario() {
    let tmp = setup_workspace();
    let before = fs::read_to_string(scenario_file(tmp.path())).unwrap();

    costsim(tmp.path())
        .args(["load", "--article", "ART-0001", "--api-base", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERP load failed"));

    assert_eq!(fs::read_to_string(scenario_file(tmp.path())).unwrap(), before);
}

// ============================================================================
// Catalog, config, completions
// ============================================================================

#[test]
fn test_catalog_listing() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tôlerie"))
        .stdout(predicate::str::contains("Usinage"));

    costsim(tmp.path())
        .args(["catalog", "Tôlerie", "ART-0002", "-f", "tsv"])
        .assert()
        .success()
        .stdout("Laser B\nPresse Plieuse B\n");
}

#[test]
fn test_catalog_from_config_file() {
    let tmp = setup_workspace();
    fs::write(
        tmp.path().join("catalog.yaml"),
        "Fonderie:\n  articles: [ART-5000]\n  technical:\n    ART-5000: [Four A]\n",
    )
    .unwrap();

    costsim(tmp.path())
        .args(["config", "set", "catalog", "../catalog.yaml"])
        .assert()
        .success();

    costsim(tmp.path())
        .args(["catalog", "-f", "tsv"])
        .assert()
        .success()
        .stdout("Fonderie\n");
}

#[test]
fn test_config_set_and_show() {
    let tmp = setup_workspace();
    costsim(tmp.path())
        .args(["config", "set", "currency", "USD"])
        .assert()
        .success();

    costsim(tmp.path())
        .args(["config", "show", "currency"])
        .assert()
        .success()
        .stdout("USD\n");

    costsim(tmp.path())
        .args(["config", "set", "request_timeout_secs", "soon"])
        .assert()
        .failure();

    costsim(tmp.path())
        .args(["config", "set", "author", "me"])
        .assert()
        .failure();
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    costsim(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("costsim"));
}
