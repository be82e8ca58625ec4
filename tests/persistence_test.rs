mod common;

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_json_file_persistence_across_runs() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");

    // 1. First run: register a payment
    let batch1 = dir.path().join("batch1.csv");
    common::write_commands(&batch1, &[["register", "cc-1", "100.0", "credit_card"]]).unwrap();

    let output1 = Command::new(cargo_bin!("paymgr"))
        .arg("--data-file")
        .arg(&data)
        .arg("apply")
        .arg(&batch1)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("cc-1,100,credit_card,REGISTERED,"));

    // 2. Second run sees the registered card and refuses another one
    let batch2 = dir.path().join("batch2.csv");
    common::write_commands(
        &batch2,
        &[
            ["register", "cc-2", "5", "credit_card"],
            ["pay", "cc-1", "", ""],
            ["register", "cc-2", "5", "credit_card"],
        ],
    )
    .unwrap();

    let output2 = Command::new(cargo_bin!("paymgr"))
        .arg("--data-file")
        .arg(&data)
        .arg("apply")
        .arg(&batch2)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    let stderr2 = String::from_utf8_lossy(&output2.stderr);

    assert!(stderr2.contains("Another credit card payment is already registered"));
    assert!(stdout2.contains("cc-1,100,credit_card,PAID,"));
    assert!(stdout2.contains("cc-2,5,credit_card,REGISTERED,"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let register = Command::new(cargo_bin!("paymgr"))
        .arg("--db-path")
        .arg(&db_path)
        .args(["register", "pp-1", "--amount", "100", "--method", "paypal"])
        .output()
        .expect("Failed to execute command");
    assert!(register.status.success());

    let list = Command::new(cargo_bin!("paymgr"))
        .arg("--db-path")
        .arg(&db_path)
        .arg("list")
        .output()
        .expect("Failed to execute command");
    assert!(list.status.success());
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("pp-1,100,paypal,REGISTERED,"));
}
