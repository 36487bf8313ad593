//! The narrow persistence interface the bookkeeping logic talks through.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use shopbook_domain::{lenient, names_match, Book, DebtorKind, Table};

use crate::{balance::outstanding_balance, CoreError};

/// Field name to new value, as sent to [`RecordStore::update_field`].
pub type FieldUpdates = Map<String, Value>;

/// Abstraction over table stores holding loosely typed JSON rows.
///
/// Rows are identified by their `"id"` column. Ordering of `list_all` is
/// whatever the backend provides; callers must not assume it is chronological.
pub trait RecordStore: Send + Sync {
    fn list_all(&self, table: Table) -> Result<Vec<Value>, CoreError>;
    fn insert(&self, table: Table, record: Value) -> Result<(), CoreError>;
    fn update_field(&self, table: Table, id: &str, fields: FieldUpdates) -> Result<(), CoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn list_all(&self, table: Table) -> Result<Vec<Value>, CoreError> {
        (**self).list_all(table)
    }

    fn insert(&self, table: Table, record: Value) -> Result<(), CoreError> {
        (**self).insert(table, record)
    }

    fn update_field(&self, table: Table, id: &str, fields: FieldUpdates) -> Result<(), CoreError> {
        (**self).update_field(table, id, fields)
    }
}

/// Serializes a typed record and inserts it.
pub fn insert_record<T: Serialize>(
    store: &dyn RecordStore,
    table: Table,
    record: &T,
) -> Result<(), CoreError> {
    store.insert(table, serde_json::to_value(record)?)
}

/// Inserts a credit or payment record, naming its columns after the debtor side
/// (`customer`/`sale_id` or `supplier`/`purchase_id`).
pub fn insert_account_record<T: Serialize>(
    store: &dyn RecordStore,
    table: Table,
    kind: DebtorKind,
    record: &T,
) -> Result<(), CoreError> {
    let mut row = serde_json::to_value(record)?;
    if let Some(columns) = row.as_object_mut() {
        if let Some(name) = columns.remove("debtor_name") {
            columns.insert(kind.name_field().to_string(), name);
        }
        if let Some(source) = columns.remove("source_id") {
            columns.insert(kind.source_field().to_string(), source);
        }
    }
    store.insert(table, row)
}

/// Reads every table into a fresh [`Book`].
pub fn load_book(store: &dyn RecordStore) -> Result<Book, CoreError> {
    Ok(Book {
        inventory: load_table(store, Table::Inventory)?,
        sales: load_table(store, Table::Sales)?,
        purchases: load_table(store, Table::Purchases)?,
        customer_credits: load_table(store, Table::CustomerCredits)?,
        supplier_credits: load_table(store, Table::SupplierCredits)?,
        customer_payments: load_table(store, Table::CustomerPayments)?,
        supplier_payments: load_table(store, Table::SupplierPayments)?,
        investor: load_table(store, Table::Investor)?,
    })
}

/// Decodes one table, skipping rows that are not JSON objects.
pub fn load_table<T: DeserializeOwned>(
    store: &dyn RecordStore,
    table: Table,
) -> Result<Vec<T>, CoreError> {
    let rows = store.list_all(table)?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let row_id = row.get("id").map(lenient::coerce_text).unwrap_or_default();
        match serde_json::from_value(row) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(%table, row_id = %row_id, error = %err, "skipping undecodable row");
            }
        }
    }
    Ok(records)
}

/// Pairs in-memory mutations with store writes without rolling anything back.
///
/// Every write is attempted; failures are logged and the first one is reported.
#[derive(Debug, Default)]
pub struct WriteLog {
    first_error: Option<CoreError>,
}

impl WriteLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, table: Table, id: &str, result: Result<(), CoreError>) {
        if let Err(err) = result {
            tracing::warn!(%table, id, error = %err, "store write failed; in-memory state kept");
            if self.first_error.is_none() {
                self.first_error = Some(err);
            }
        }
    }

    pub fn finish(self) -> Result<(), CoreError> {
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Builds a single-field update map.
pub fn field(name: &str, value: impl Into<Value>) -> FieldUpdates {
    let mut fields = Map::new();
    fields.insert(name.to_string(), value.into());
    fields
}

/// Detects dangling references and inconsistent balances within a book snapshot.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let mut warnings = Vec::new();

    for sale in &book.sales {
        if !sale.item_id.is_empty() && book.item(&sale.item_id).is_none() {
            warnings.push(format!(
                "sale {} references unknown item {}",
                sale.id, sale.item_id
            ));
        }
    }
    for purchase in &book.purchases {
        if !purchase.is_operating_expense() && book.item(&purchase.item_id).is_none() {
            warnings.push(format!(
                "purchase {} references unknown item {}",
                purchase.id, purchase.item_id
            ));
        }
    }
    for (label, debts) in [
        ("customer credit", &book.customer_credits),
        ("supplier credit", &book.supplier_credits),
    ] {
        for debt in debts {
            if outstanding_balance(debt) < 0.0 {
                warnings.push(format!(
                    "{} {} is overpaid by {}",
                    label,
                    debt.id,
                    -outstanding_balance(debt)
                ));
            }
        }
    }
    for payment in &book.customer_payments {
        let known = book
            .customer_credits
            .iter()
            .any(|debt| names_match(&debt.debtor_name, &payment.debtor_name));
        if !known {
            warnings.push(format!(
                "customer payment {} has no credits for `{}`",
                payment.id, payment.debtor_name
            ));
        }
    }
    for item in &book.inventory {
        if item.stock < 0 {
            warnings.push(format!("item {} has negative stock {}", item.id, item.stock));
        }
    }
    warnings
}
