//! Process-local [`RecordStore`] used by tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use shopbook_domain::{lenient, Table};

use crate::storage::{FieldUpdates, RecordStore};
use crate::CoreError;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Table, Vec<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Seeds a store with every row of `book`, preserving collection order.
    pub fn from_book(book: &shopbook_domain::Book) -> Result<Self, CoreError> {
        let value = serde_json::to_value(book)?;
        let store = Self::new();
        {
            let mut tables = store
                .tables
                .write()
                .map_err(|_| CoreError::LockPoisoned("seed"))?;
            for table in Table::ALL {
                let rows = match value.get(table.as_str()) {
                    Some(Value::Array(rows)) => rows.clone(),
                    _ => Vec::new(),
                };
                tables.insert(table, rows);
            }
        }
        Ok(store)
    }

    pub fn row_count(&self, table: Table) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(&table).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl RecordStore for MemoryStore {
    fn list_all(&self, table: Table) -> Result<Vec<Value>, CoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| CoreError::LockPoisoned("read"))?;
        Ok(tables.get(&table).cloned().unwrap_or_default())
    }

    fn insert(&self, table: Table, record: Value) -> Result<(), CoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| CoreError::LockPoisoned("write"))?;
        tables.entry(table).or_default().push(record);
        Ok(())
    }

    fn update_field(&self, table: Table, id: &str, fields: FieldUpdates) -> Result<(), CoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| CoreError::LockPoisoned("write"))?;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| {
                rows.iter_mut().find(|row| {
                    row.get("id")
                        .map(|value| lenient::coerce_text(value) == id)
                        .unwrap_or(false)
                })
            })
            .and_then(Value::as_object_mut)
            .ok_or_else(|| CoreError::Storage(format!("{table} row `{id}` not found")))?;
        row.extend(fields);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::field;
    use serde_json::json;

    #[test]
    fn update_field_targets_row_by_id() {
        let store = MemoryStore::new();
        store
            .insert(Table::CustomerCredits, json!({"id": "c1", "paid": 0}))
            .unwrap();
        store
            .insert(Table::CustomerCredits, json!({"id": 42, "paid": 0}))
            .unwrap();

        store
            .update_field(Table::CustomerCredits, "42", field("paid", 150.0))
            .expect("update numeric id");

        let rows = store.list_all(Table::CustomerCredits).unwrap();
        assert_eq!(rows[0]["paid"], json!(0));
        assert_eq!(rows[1]["paid"], json!(150.0));
    }

    #[test]
    fn update_field_reports_missing_rows() {
        let store = MemoryStore::new();
        let err = store
            .update_field(Table::Sales, "nope", field("quantity", 1))
            .expect_err("missing row must fail");
        assert!(matches!(err, CoreError::Storage(ref msg) if msg.contains("nope")));
    }
}
