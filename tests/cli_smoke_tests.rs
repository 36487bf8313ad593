use assert_cmd::Command;
use predicates::str::contains;
use tempfile::{tempdir, TempDir};

fn shopbook(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shopbook_cli").unwrap();
    cmd.env("SHOPBOOK_HOME", home.path()).env("NO_COLOR", "1");
    cmd
}

#[test]
fn sale_settlement_and_balances_flow() {
    let home = tempdir().unwrap();

    shopbook(&home)
        .args(["add-item", "Bleu", "60000", "100000", "5", "Chanel"])
        .assert()
        .success()
        .stdout(contains("Added item"));
    shopbook(&home)
        .args(["sale", "bleu", "2", "fiado", "2024-03-01", "Ana"])
        .assert()
        .success()
        .stdout(contains("$200.000 (Fiado)"));
    shopbook(&home)
        .args(["settle-customer", "Ana", "150000", "2024-03-05", "transferencia"])
        .assert()
        .success()
        .stdout(contains("Balance after:  $50.000"));
    shopbook(&home)
        .args(["purchase", "Bleu", "1", "60000", "efectivo", "2024-03-06"])
        .assert()
        .success();

    shopbook(&home)
        .arg("balances")
        .assert()
        .success()
        .stdout(contains("Caja:  $-60.000"))
        .stdout(contains("Banco: $150.000"));
    shopbook(&home)
        .args(["ledger", "2024-03-01", "2024-03-31"])
        .assert()
        .success()
        .stdout(contains("Abono cliente — Transferencia"))
        .stdout(contains("Compra inventario"));
    shopbook(&home)
        .args(["balance", "customer", "ana"])
        .assert()
        .success()
        .stdout(contains("ana: $50.000"));
}

#[test]
fn script_mode_reports_failures_and_keeps_going() {
    let home = tempdir().unwrap();
    let input = "# setup\n\
                 add-item \"Light Blue\" 50000 90000 2\n\
                 sale \"light blue\" 9 efectivo\n\
                 expense 20000 efectivo 2024-06-01 \"\" arriendo local\n\
                 balances\n\
                 exit\n\
                 balances\n";

    shopbook(&home)
        .arg("script")
        .write_stdin(input)
        .assert()
        .failure()
        .stdout(contains("Recorded expense"))
        .stdout(contains("Caja:  $-20.000"))
        .stderr(contains("Insufficient stock"))
        .stderr(contains("1 script command(s) failed"));
}

#[test]
fn unknown_command_suggests_closest_match() {
    let home = tempdir().unwrap();
    shopbook(&home)
        .arg("balnces")
        .assert()
        .failure()
        .stderr(contains("Suggestion: `balances`?"));
}

#[test]
fn settling_zero_records_nothing() {
    let home = tempdir().unwrap();
    shopbook(&home)
        .args(["settle-supplier", "Sol", "0"])
        .assert()
        .success()
        .stdout(contains("Nothing to record"));
    shopbook(&home)
        .arg("ledger")
        .assert()
        .success()
        .stdout(contains("No movements"));
}

#[test]
fn config_set_validates_and_persists() {
    let home = tempdir().unwrap();
    shopbook(&home)
        .args(["config", "set", "investor_share", "40"])
        .assert()
        .success()
        .stdout(contains("Updated investor_share"));
    shopbook(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("\"investor_share\": 40.0"));
    shopbook(&home)
        .args(["config", "set", "investor_share", "lots"])
        .assert()
        .failure()
        .stderr(contains("Invalid value `lots` for `investor_share`"));
}
