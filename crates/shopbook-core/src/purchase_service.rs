//! Inventory purchases and operating expenses.

use serde_json::Map;
use shopbook_domain::{
    new_id, Book, DebtRecord, DebtorKind, PaymentMethod, Purchase, Table,
};

use crate::{
    storage::{insert_account_record, insert_record, RecordStore, WriteLog},
    CoreError,
};

/// How a purchase is paid for.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseTerms {
    /// Paid immediately; shows up in the cash/bank ledger.
    Cash(PaymentMethod),
    /// Owed to the supplier; opens a supplier credit instead of a ledger movement.
    SupplierCredit { due_date: Option<String> },
}

/// Input for [`PurchaseService::record_purchase`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    /// Empty for operating expenses.
    pub item_id: String,
    pub quantity: i64,
    pub unit_cost: f64,
    pub date: String,
    pub supplier: String,
    pub invoice: String,
    pub notes: String,
    pub terms: PurchaseTerms,
}

impl NewPurchase {
    pub fn stock(
        item_id: impl Into<String>,
        quantity: i64,
        unit_cost: f64,
        date: impl Into<String>,
        terms: PurchaseTerms,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            unit_cost,
            date: date.into(),
            supplier: String::new(),
            invoice: String::new(),
            notes: String::new(),
            terms,
        }
    }

    /// An expense that does not touch inventory, billed as a single unit.
    pub fn expense(amount: f64, date: impl Into<String>, terms: PurchaseTerms) -> Self {
        Self::stock(String::new(), 1, amount, date, terms)
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self
    }
}

pub struct PurchaseService;

impl PurchaseService {
    pub fn record_purchase(
        book: &mut Book,
        store: &dyn RecordStore,
        input: NewPurchase,
    ) -> Result<Purchase, CoreError> {
        let supplier = input.supplier.trim().to_string();
        if matches!(input.terms, PurchaseTerms::SupplierCredit { .. }) && supplier.is_empty() {
            return Err(CoreError::Validation(
                "a supplier name is required for purchases on credit".into(),
            ));
        }
        if !input.unit_cost.is_finite() || input.unit_cost < 0.0 {
            return Err(CoreError::Validation("unit cost must be zero or more".into()));
        }
        let is_expense = input.item_id.trim().is_empty();
        if !is_expense && input.quantity <= 0 {
            return Err(CoreError::Validation(
                "purchase quantity must be at least 1".into(),
            ));
        }
        if !is_expense && book.item(&input.item_id).is_none() {
            return Err(CoreError::ItemNotFound(input.item_id));
        }

        let purchase = Purchase {
            id: new_id(),
            date: input.date,
            item_id: if is_expense {
                String::new()
            } else {
                input.item_id
            },
            quantity: if is_expense { 1 } else { input.quantity },
            unit_cost: input.unit_cost,
            supplier,
            notes: input.notes,
            invoice: input.invoice,
            cash_method: match &input.terms {
                PurchaseTerms::Cash(method) => Some(method.label().to_string()),
                PurchaseTerms::SupplierCredit { .. } => None,
            },
        };

        let mut stock_update = Map::new();
        if let Some(item) = book
            .item_mut(&purchase.item_id)
            .filter(|_| !is_expense)
        {
            item.stock += purchase.quantity;
            stock_update.insert("stock".into(), item.stock.into());
            if purchase.unit_cost > 0.0 {
                item.cost = purchase.unit_cost;
                stock_update.insert("cost".into(), item.cost.into());
            }
        }

        let credit = match input.terms {
            PurchaseTerms::SupplierCredit { due_date } => {
                let mut credit =
                    DebtRecord::new(&purchase.supplier, purchase.date.clone(), purchase.total())
                        .with_source(&purchase.id);
                credit.due_date = due_date;
                credit.invoice =
                    Some(purchase.invoice.clone()).filter(|invoice| !invoice.is_empty());
                credit.notes = purchase.notes.clone();
                Some(credit)
            }
            PurchaseTerms::Cash(_) => None,
        };

        book.purchases.push(purchase.clone());
        if let Some(credit) = &credit {
            book.supplier_credits.push(credit.clone());
        }
        tracing::info!(
            purchase_id = %purchase.id,
            expense = is_expense,
            total = purchase.total(),
            on_credit = credit.is_some(),
            "recorded purchase"
        );

        let mut writes = WriteLog::new();
        writes.record(
            Table::Purchases,
            &purchase.id,
            insert_record(store, Table::Purchases, &purchase),
        );
        if !stock_update.is_empty() {
            writes.record(
                Table::Inventory,
                &purchase.item_id,
                store.update_field(Table::Inventory, &purchase.item_id, stock_update),
            );
        }
        if let Some(credit) = &credit {
            writes.record(
                Table::SupplierCredits,
                &credit.id,
                insert_account_record(store, Table::SupplierCredits, DebtorKind::Supplier, credit),
            );
        }
        writes.finish()?;
        Ok(purchase)
    }
}
