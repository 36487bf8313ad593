//! The in-memory snapshot of every table a session works on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    debt::{DebtRecord, DebtorKind},
    inventory::InventoryItem,
    investor::InvestorEntry,
    payment::PaymentRecord,
    purchase::Purchase,
    sale::Sale,
};

/// Logical tables exposed by the persistence collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Inventory,
    Sales,
    Purchases,
    CustomerCredits,
    SupplierCredits,
    CustomerPayments,
    SupplierPayments,
    Investor,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Inventory,
        Table::Sales,
        Table::Purchases,
        Table::CustomerCredits,
        Table::SupplierCredits,
        Table::CustomerPayments,
        Table::SupplierPayments,
        Table::Investor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Inventory => "inventory",
            Table::Sales => "sales",
            Table::Purchases => "purchases",
            Table::CustomerCredits => "customer_credits",
            Table::SupplierCredits => "supplier_credits",
            Table::CustomerPayments => "customer_payments",
            Table::SupplierPayments => "supplier_payments",
            Table::Investor => "investor",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.as_str() == raw)
    }

    /// Debt table for the given side of the business.
    pub fn credits_for(kind: DebtorKind) -> Self {
        match kind {
            DebtorKind::Customer => Table::CustomerCredits,
            DebtorKind::Supplier => Table::SupplierCredits,
        }
    }

    /// Payment table for the given side of the business.
    pub fn payments_for(kind: DebtorKind) -> Self {
        match kind {
            DebtorKind::Customer => Table::CustomerPayments,
            DebtorKind::Supplier => Table::SupplierPayments,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All records for one session, passed explicitly to every operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Book {
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub customer_credits: Vec<DebtRecord>,
    #[serde(default)]
    pub supplier_credits: Vec<DebtRecord>,
    #[serde(default)]
    pub customer_payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub supplier_payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub investor: Vec<InvestorEntry>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credits(&self, kind: DebtorKind) -> &[DebtRecord] {
        match kind {
            DebtorKind::Customer => &self.customer_credits,
            DebtorKind::Supplier => &self.supplier_credits,
        }
    }

    pub fn payments(&self, kind: DebtorKind) -> &[PaymentRecord] {
        match kind {
            DebtorKind::Customer => &self.customer_payments,
            DebtorKind::Supplier => &self.supplier_payments,
        }
    }

    /// Mutable access to the debt and payment collections of one side at once.
    pub fn accounts_mut(
        &mut self,
        kind: DebtorKind,
    ) -> (&mut Vec<DebtRecord>, &mut Vec<PaymentRecord>) {
        match kind {
            DebtorKind::Customer => (&mut self.customer_credits, &mut self.customer_payments),
            DebtorKind::Supplier => (&mut self.supplier_credits, &mut self.supplier_payments),
        }
    }

    pub fn item(&self, id: &str) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut InventoryItem> {
        self.inventory.iter_mut().find(|item| item.id == id)
    }

    pub fn row_count(&self) -> usize {
        self.inventory.len()
            + self.sales.len()
            + self.purchases.len()
            + self.customer_credits.len()
            + self.supplier_credits.len()
            + self.customer_payments.len()
            + self.supplier_payments.len()
            + self.investor.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_roundtrip() {
        for table in Table::ALL {
            assert_eq!(Table::parse(table.as_str()), Some(table));
        }
        assert_eq!(Table::parse("settings"), None);
    }

    #[test]
    fn accounts_follow_debtor_kind() {
        let mut book = Book::new();
        book.supplier_credits
            .push(DebtRecord::new("Perfumes SA", "2024-01-01", 10.0));
        let (credits, payments) = book.accounts_mut(DebtorKind::Supplier);
        assert_eq!(credits.len(), 1);
        assert!(payments.is_empty());
        assert!(book.credits(DebtorKind::Customer).is_empty());
    }
}
