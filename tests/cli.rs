//! E2E tests running the binary against the fixture price table

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/vehicles.csv")
}

fn dutycalc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dutycalc"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Run a command against the fixture file and return stdout, asserting success
fn run_with_fixture(args: &[&str]) -> String {
    let file = fixture();
    let mut full: Vec<&str> = args.to_vec();
    full.extend(["--file", file.to_str().unwrap()]);

    let output = dutycalc(&full);
    assert!(output.status.success(), "Command failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Search results are sorted by duty and carry the formatted estimate
#[test]
fn search_table_sorted_by_duty() {
    let stdout = run_with_fixture(&["search", "toyota"]);

    assert!(stdout.starts_with("Found 2 vehicles\n"));
    assert!(stdout.contains("Estimated Duty"));
    assert!(stdout.contains("KES 1,065,238"));
    assert!(stdout.contains("KES 1,929,918"));

    let prado = stdout.find("TOYOTA PRADO").unwrap();
    let cruiser = stdout.find("TOYOTA LAND CRUISER").unwrap();
    assert!(prado < cruiser);
    assert!(!stdout.contains("MAZDA"));
}

/// JSON output exposes the record and its breakdown
#[test]
fn search_json_output() {
    let stdout = run_with_fixture(&["search", "--json"]);
    let matches: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let matches = matches.as_array().unwrap();

    assert_eq!(matches.len(), 7);
    let names: Vec<&str> = matches
        .iter()
        .map(|m| m["vehicle"]["search_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "HONDA FIT",
            "SUBARU FORESTER",
            "MAZDA DEMIO",
            "NISSAN LEAF",
            "TOYOTA PRADO",
            "BMW X5",
            "TOYOTA LAND CRUISER",
        ]
    );

    assert_eq!(matches[3]["duty"]["bracket"], "Electric");
    assert_eq!(matches[6]["duty"]["bracket"], "LargeEngine");
    assert_eq!(matches[6]["vehicle"]["cc"], 4461);
    assert_eq!(matches[2]["vehicle"]["model_code"], "DJ3FS");
}

/// Limit caps the number of results
#[test]
fn search_limit() {
    let stdout = run_with_fixture(&["search", "--json", "--limit", "2"]);
    let matches: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 2);

    let stdout = run_with_fixture(&["search", "--limit", "2"]);
    assert!(stdout.contains("Found 7 vehicles, showing the first 2"));
    assert!(stdout.contains("SUBARU FORESTER"));
    assert!(!stdout.contains("MAZDA DEMIO"));
}

/// The selected year changes the estimate
#[test]
fn year_changes_estimate() {
    let old = run_with_fixture(&["quote", "subaru forester"]);
    assert!(old.contains("KES 245,824"));
    assert!(old.contains("depreciation 60%"));

    let new = run_with_fixture(&["quote", "subaru forester", "--year", "2025"]);
    assert!(new.contains("KES 583,833"));
    assert!(new.contains("depreciation 5%"));
}

/// Quote shows every component of the cascade
#[test]
fn quote_breakdown() {
    let stdout = run_with_fixture(&["quote", "MAZDA DEMIO"]);

    for component in ["Customs Value", "Import Duty", "Excise Duty", "VAT", "IDF", "RDL"] {
        assert!(stdout.contains(component), "missing {}", component);
    }
    assert!(stdout.contains("Up to 1500cc"));
    assert!(stdout.contains("KES 283,280"));
}

/// Unknown vehicle names fail
#[test]
fn quote_unknown_vehicle() {
    let file = fixture();
    let output = dutycalc(&["quote", "LADA NIVA", "--file", file.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("LADA NIVA"));
}

/// Degraded values still produce a (zero) estimate
#[test]
fn degraded_price_yields_zero_duty() {
    let stdout = run_with_fixture(&["quote", "honda fit"]);
    assert!(stdout.contains("KES 0"));
}

/// Market filters combine, and values within one filter are alternatives
#[test]
fn market_filters() {
    let stdout = run_with_fixture(&["market", "--fuel", "diesel"]);
    assert!(stdout.contains("TOYOTA LAND CRUISER"));
    assert!(stdout.contains("BMW X5"));
    assert!(!stdout.contains("TOYOTA PRADO"));

    let stdout = run_with_fixture(&[
        "market",
        "--body",
        "hatchback",
        "--fuel",
        "GASOLINE,ELECTRIC",
    ]);
    assert!(stdout.contains("MAZDA DEMIO"));
    assert!(stdout.contains("NISSAN LEAF"));
    assert!(!stdout.contains("HONDA FIT"));
    assert!(!stdout.contains("SUBARU"));
}

/// Facets list distinct values with numbers in numeric order
#[test]
fn market_facets() {
    let stdout = run_with_fixture(&["market", "--facets"]);
    assert!(stdout.contains("cc: 0, 1300, 1800, 2700, 2993, 4461"));
    assert!(stdout.contains("seating: 5, 7, 8, -"));
    assert!(stdout.contains("fuel: -, DIESEL, ELECTRIC, GASOLINE"));
}

/// Reports are written as XLSX or CSV depending on the extension
#[test]
fn market_report_export() {
    let dir = tempfile::tempdir().unwrap();

    let xlsx = dir.path().join("market_report.xlsx");
    run_with_fixture(&["market", "--output", xlsx.to_str().unwrap()]);
    let bytes = fs::read(&xlsx).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let csv = dir.path().join("diesel.csv");
    run_with_fixture(&["market", "--fuel", "DIESEL", "-o", csv.to_str().unwrap()]);
    let text = fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Search_Name,Category,CC,Fuel,Drive,Transmission,Seating,Estimated Duty"
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "BMW X5,-,2993,DIESEL,AWD,AT,-,\"KES 1,579,024\"");
}

/// Unsupported report formats are rejected
#[test]
fn market_report_bad_extension() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    let file = fixture();
    let output = dutycalc(&[
        "market",
        "--output",
        pdf.to_str().unwrap(),
        "--file",
        file.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!pdf.exists());
}

/// Compare prints a column per vehicle
#[test]
fn compare_vehicles() {
    let stdout = run_with_fixture(&["compare", "bmw x5", "toyota prado", "BMW X5"]);
    assert!(stdout.contains("Spec"));
    assert_eq!(stdout.matches("BMW X5").count(), 1);
    assert!(!stdout.contains("BMW X5 ("));
    assert!(stdout.find("TOYOTA PRADO").unwrap() < stdout.find("BMW X5").unwrap());
    assert!(stdout.contains("KES 6,500,000"));
    assert!(stdout.contains("KES 1,579,024"));
}

/// Inspect reports the column mapping and degraded fields
#[test]
fn inspect_mapping() {
    let stdout = run_with_fixture(&["inspect", "--all"]);
    assert!(stdout.contains("SHA-256"));
    assert!(stdout.contains("Engine Capacity (cc)"));
    assert!(stdout.contains("Model_Code"));
    assert!(stdout.contains("DEGRADED FIELDS"));
    assert!(stdout.contains("'not available' is not a number"));
}

/// Inspect JSON output shows the seating column falling through past CC
#[test]
fn inspect_json_capacity_exclusivity() {
    let stdout = run_with_fixture(&["inspect", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let columns = report["columns"].as_array().unwrap();

    let target = |label: &str| {
        columns
            .iter()
            .find(|c| c["label"] == label)
            .map(|c| c["resolution"]["target"].clone())
            .unwrap()
    };
    assert_eq!(target("Engine Capacity (cc)"), "CC");
    assert_eq!(target("Seating Capacity"), "Seating");
    assert_eq!(target("Model Number"), "Model_Code");
    assert_eq!(report["records"], 7);
}

/// Schema prints the report row JSON schema
#[test]
fn schema_json() {
    let output = dutycalc(&["schema"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"Estimated Duty\""));
    assert!(stdout.contains("\"Search_Name\""));
}

/// Without --file the largest table in --dir is used
#[test]
fn discovery_picks_largest_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture(), dir.path().join("prices.csv")).unwrap();
    fs::write(dir.path().join("old.csv"), "Make,Model,CRSP\nLada,Niva,100\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "x".repeat(10_000)).unwrap();

    let output = dutycalc(&["search", "niva", "--dir", dir.path().to_str().unwrap()]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No vehicles found"));

    let output = dutycalc(&["search", "prado", "--dir", dir.path().to_str().unwrap()]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("TOYOTA PRADO"));
}

/// An empty directory is reported with a hint
#[test]
fn discovery_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let output = dutycalc(&["search", "--dir", dir.path().to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--file"), "stderr: {}", stderr);
    assert!(stderr.contains("no .csv or .xlsx file found"));
}

/// Years outside the depreciation window are rejected by the parser
#[test]
fn year_out_of_range() {
    let file = fixture();
    for year in ["2017", "2026"] {
        let output = dutycalc(&["search", "--year", year, "--file", file.to_str().unwrap()]);
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(2));
    }
}

/// Session commands share one table and honour year changes
#[test]
fn session_loop() {
    use std::io::Write;
    use std::process::Stdio;

    let file = fixture();
    let mut child = Command::new(env!("CARGO_BIN_EXE_dutycalc"))
        .args(["session", "--file", file.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn session");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"quote subaru forester\nyear 2025\nquote subaru forester\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("7 vehicles"));
    assert!(stdout.contains("KES 245,824"));
    assert!(stdout.contains("year set to 2025"));
    assert!(stdout.contains("KES 583,833"));
}
