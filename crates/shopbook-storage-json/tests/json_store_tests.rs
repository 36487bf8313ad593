use serde_json::json;
use shopbook_core::{
    load_book,
    storage::{field, RecordStore},
    PaymentRequest, SettlementService,
};
use shopbook_domain::Table;
use shopbook_storage_json::{JsonRecordStore, StorePaths};
use std::fs;
use tempfile::tempdir;

#[test]
fn json_store_persists_inserts_and_updates() {
    let dir = tempdir().expect("tempdir");
    let paths = StorePaths::under(dir.path());
    let store = JsonRecordStore::open(paths.clone()).expect("open store");

    store
        .insert(
            Table::CustomerCredits,
            json!({"id": "c1", "customer": "Ana", "date": "2024-01-01", "total": 500, "paid": 0}),
        )
        .expect("insert");
    store
        .update_field(Table::CustomerCredits, "c1", field("paid", 200.0))
        .expect("update");
    assert!(paths.book_file.exists());
    assert!(!dir.path().join("book.json.tmp").exists());

    let reopened = JsonRecordStore::open(paths).expect("reopen store");
    let rows = reopened.list_all(Table::CustomerCredits).expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["paid"], json!(200.0));
    assert!(reopened.list_all(Table::Sales).expect("sales").is_empty());
}

#[test]
fn json_store_rejects_unknown_row_updates() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::open(StorePaths::under(dir.path())).expect("open store");
    let err = store
        .update_field(Table::Sales, "missing", field("quantity", 2))
        .expect_err("unknown id");
    assert!(err.to_string().contains("missing"));
}

#[test]
fn settlement_round_trips_through_json_store() {
    let dir = tempdir().expect("tempdir");
    let paths = StorePaths::under(dir.path());
    let store = JsonRecordStore::open(paths.clone()).expect("open store");
    for (id, date) in [("feb", "2024-02-01"), ("jan", "2024-01-01")] {
        store
            .insert(
                Table::SupplierCredits,
                json!({"id": id, "supplier": "Acme", "date": date, "total": 500, "paid": 0}),
            )
            .expect("seed credit");
    }

    let mut book = load_book(&store).expect("load book");
    let outcome = SettlementService::settle_supplier(
        &mut book,
        &store,
        &PaymentRequest::new("acme", 700.0, "2024-03-01", "transferencia"),
    )
    .expect("settle");
    assert_eq!(outcome.applied, 700.0);

    let reloaded = load_book(&JsonRecordStore::open(paths).expect("reopen")).expect("reload");
    assert_eq!(reloaded.supplier_credits, book.supplier_credits);
    assert_eq!(reloaded.supplier_payments.len(), 1);
    assert_eq!(reloaded.supplier_payments[0].method, "Transferencia");
    assert_eq!(reloaded.supplier_payments[0].breakdown.len(), 2);
}

#[test]
fn json_store_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::with_retention(StorePaths::under(dir.path()), 2)
        .expect("open store");
    store
        .insert(Table::Investor, json!({"id": "e1", "type": "Aporte", "amount": 1000}))
        .expect("insert");

    let info = store.backup(Some("before import")).expect("backup");
    assert!(info.id.ends_with("_before-import.json"));
    assert!(info.created_at.is_some());

    store
        .insert(Table::Investor, json!({"id": "e2", "type": "Retiro", "amount": 300}))
        .expect("insert");
    assert_eq!(store.list_all(Table::Investor).expect("rows").len(), 2);

    let backups = store.list_backups().expect("list backups");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    store.restore_backup(&info).expect("restore");
    assert_eq!(store.list_all(Table::Investor).expect("rows").len(), 1);

    for note in ["one", "two", "three"] {
        store.backup(Some(note)).expect("backup");
    }
    assert_eq!(store.list_backups().expect("list").len(), 2);
}

#[test]
fn json_store_imports_flat_documents() {
    let dir = tempdir().expect("tempdir");
    let paths = StorePaths::under(dir.path());
    fs::write(
        &paths.book_file,
        json!({
            "settings": {"currency": "COP"},
            "credits": [{"id": "c1", "customer": "Ana", "total": "1500", "paid": null}],
            "credit_payments": [{"id": "p1", "customer": "Ana", "amount": 500, "method": "Efectivo"}],
            "supplier_payments": []
        })
        .to_string(),
    )
    .expect("write flat document");

    let store = JsonRecordStore::open(paths).expect("open store");
    let book = load_book(&store).expect("load");
    assert_eq!(book.customer_credits.len(), 1);
    assert_eq!(book.customer_credits[0].total, 1500.0);
    assert_eq!(book.customer_credits[0].paid, 0.0);
    assert_eq!(book.customer_payments.len(), 1);
}
