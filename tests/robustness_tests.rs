use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_malformed_order_rows_are_skipped() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "id, status").unwrap();
    writeln!(csv, "1, completed").unwrap();
    // Unknown status
    writeln!(csv, "2, shipped").unwrap();
    // Non-numeric id
    writeln!(csv, "abc, pending").unwrap();
    // Zero never correlates to an order
    writeln!(csv, "0, pending").unwrap();
    writeln!(csv, "5, on-hold").unwrap();

    let mut cmd = Command::new(cargo_bin!("order-webhooks"));
    cmd.arg("import-orders").arg(csv.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading order"))
        .stdout(predicate::str::contains("1,completed"))
        .stdout(predicate::str::contains("5,on-hold"))
        .stdout(predicate::str::contains("shipped").not())
        .stdout(predicate::str::contains("0,pending").not());
}

#[test]
fn test_missing_input_file_fails() {
    let mut cmd = Command::new(cargo_bin!("order-webhooks"));
    cmd.arg("import-orders").arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
