//! E2E tests for the report, gains, rates and validate commands

use std::process::Command;

fn run_capgains(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"].iter().copied().chain(args.iter().copied()))
        .output()
        .expect("Failed to execute command")
}

#[test]
fn report_text_output() {
    let output = run_capgains(&[
        "report",
        "-i",
        "tests/data/input.json",
        "-r",
        "tests/data/rates.json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("CAPITAL GAINS"));
    // (150 - 100) * 100 * 80
    assert!(stdout.contains("₹400000.00"));
    assert!(stdout.contains("ADVANCE TAX QUARTERS"));
    assert!(stdout.contains("Upto 15 Jun"));
    assert!(stdout.contains("DIVIDENDS"));
    assert!(stdout.contains("NET PAYABLE"));
}

#[test]
fn report_json_output() {
    let output = run_capgains(&[
        "report",
        "-i",
        "tests/data/input.json",
        "-r",
        "tests/data/rates.json",
        "--json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    // Foreign LTCG 400,000 at 14.95%, Indian STCG 12,500 at 23.92%.
    assert!(stdout.contains("\"foreign_ltcg\": \"400000.00\""));
    assert!(stdout.contains("\"tax_foreign_ltcg\": \"59800.00\""));
    assert!(stdout.contains("\"tax_indian_stcg\": \"2990.00\""));
    assert!(stdout.contains("\"surcharge\": \"7875.00\""));
    assert!(stdout.contains("\"cess\": \"2415.00\""));
    assert!(stdout.contains("\"total_tax\": \"62790.00\""));
    assert!(stdout.contains("\"taxes_paid\": \"10000.00\""));
    assert!(stdout.contains("\"net_payable\": \"52790.00\""));
    assert!(stdout.contains("\"dividends\": \"2000.00\""));
}

#[test]
fn gains_table_output() {
    let output = run_capgains(&[
        "gains",
        "-i",
        "tests/data/input.json",
        "-r",
        "tests/data/rates.json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("AAPL"));
    assert!(stdout.contains("2y 5m"));
    assert!(stdout.contains("LT"));
    // The statement row appears too, with no share detail.
    assert!(stdout.contains("RELIANCE"));
    assert!(stdout.contains("ST"));
}

#[test]
fn gains_csv_output() {
    let output = run_capgains(&[
        "gains",
        "-i",
        "tests/data/input.json",
        "-r",
        "tests/data/rates.json",
        "--csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("sale_date"));
    assert!(stdout.contains("asset_class"));
    assert!(stdout.contains("AAPL"));
}

#[test]
fn gains_filter_by_asset_class() {
    let output = run_capgains(&[
        "gains",
        "-i",
        "tests/data/input.json",
        "-r",
        "tests/data/rates.json",
        "--asset",
        "indian-stock",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("RELIANCE"));
    assert!(!stdout.contains("AAPL"));
}

#[test]
fn csv_input_with_linked_sale() {
    let output = run_capgains(&[
        "report",
        "-i",
        "tests/data/transactions.csv",
        "-r",
        "tests/data/rates.json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("CAPITAL GAINS"));
    // The RSU acquisition date has no daily rate, so the quarterly
    // approximation kicks in and gets flagged.
    assert!(stdout.contains("WARNINGS"));
    assert!(stdout.contains("approximate rate"));
}

#[test]
fn rates_audit_shows_resolution_basis() {
    let output = run_capgains(&[
        "rates",
        "-r",
        "tests/data/rates.json",
        "2022-01-03",
        "2022-01-05",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("exact"));
    // 2022-01-05 has no entry and nothing within 7 days forward.
    assert!(stdout.contains("backward"));
}

#[test]
fn validate_clean_input() {
    let output = run_capgains(&[
        "validate",
        "-i",
        "tests/data/input.json",
        "-r",
        "tests/data/rates.json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("No issues found"));
}

#[test]
fn validate_flags_missing_cost_basis() {
    let output = run_capgains(&[
        "validate",
        "-i",
        "tests/data/shortfall.json",
        "-r",
        "tests/data/rates.json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success(), "Expected non-zero exit: {:?}", output);
    assert!(stdout.contains("CostBasisMissing"));
    assert!(stdout.contains("AAPL"));
}
