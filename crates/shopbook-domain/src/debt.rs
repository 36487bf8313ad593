//! Customer credits ("fiados") and supplier credits share one record shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{common::names_match, lenient, money::new_id};

/// Which side of the business owes the money.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DebtorKind {
    /// Receivable: a customer owes the shop.
    Customer,
    /// Payable: the shop owes a supplier.
    Supplier,
}

impl DebtorKind {
    /// Placeholder shown when a record carries no debtor name.
    pub fn placeholder_name(self) -> &'static str {
        match self {
            DebtorKind::Customer => "Cliente",
            DebtorKind::Supplier => "Proveedor",
        }
    }

    /// Column holding the debtor's name in persisted credit and payment rows.
    pub fn name_field(self) -> &'static str {
        match self {
            DebtorKind::Customer => "customer",
            DebtorKind::Supplier => "supplier",
        }
    }

    /// Column linking a persisted credit row to the sale or purchase that opened it.
    pub fn source_field(self) -> &'static str {
        match self {
            DebtorKind::Customer => "sale_id",
            DebtorKind::Supplier => "purchase_id",
        }
    }
}

impl fmt::Display for DebtorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DebtorKind::Customer => "customer",
            DebtorKind::Supplier => "supplier",
        };
        f.write_str(label)
    }
}

/// An amount owed, created by a credit sale or a credit purchase.
///
/// `total` is fixed at creation; `paid` only ever grows through settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(
        default,
        alias = "customer",
        alias = "supplier",
        deserialize_with = "lenient::text"
    )]
    pub debtor_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub paid: f64,
    /// Originating sale or purchase.
    #[serde(
        default,
        alias = "sale_id",
        alias = "purchase_id",
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
}

impl DebtRecord {
    pub fn new(debtor_name: impl Into<String>, date: impl Into<String>, total: f64) -> Self {
        Self {
            id: new_id(),
            debtor_name: debtor_name.into(),
            date: date.into(),
            total,
            paid: 0.0,
            source_id: None,
            due_date: None,
            phone: None,
            invoice: None,
            notes: String::new(),
        }
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn belongs_to(&self, debtor_name: &str) -> bool {
        names_match(&self.debtor_name, debtor_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_supplier_rows_with_garbage_numbers() {
        let row = json!({
            "id": "s1",
            "supplier": "Perfumes SA",
            "date": "2024-01-10",
            "purchase_id": "pu1",
            "total": "not a number",
            "due_date": null
        });
        let debt: DebtRecord = serde_json::from_value(row).expect("decode debt");
        assert_eq!(debt.debtor_name, "Perfumes SA");
        assert_eq!(debt.total, 0.0);
        assert_eq!(debt.paid, 0.0);
        assert_eq!(debt.source_id.as_deref(), Some("pu1"));
        assert!(debt.due_date.is_none());
    }

    #[test]
    fn new_records_start_unpaid() {
        let debt = DebtRecord::new("Ana", "2024-01-01", 500.0).with_source("sale-1");
        assert_eq!(debt.paid, 0.0);
        assert!(debt.belongs_to("  ANA"));
        assert_eq!(debt.source_id.as_deref(), Some("sale-1"));
    }
}
