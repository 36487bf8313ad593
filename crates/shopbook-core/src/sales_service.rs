//! Recording sales against inventory stock.

use shopbook_domain::{new_id, Book, DebtRecord, DebtorKind, Sale, SalePayment, Table};

use crate::{
    storage::{field, insert_account_record, insert_record, RecordStore, WriteLog},
    CoreError,
};

/// Input for [`SalesService::record_sale`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub item_id: String,
    pub quantity: i64,
    /// Falls back to the item's list price when `None`.
    pub unit_price: Option<f64>,
    pub date: String,
    pub customer: String,
    pub payment: SalePayment,
    pub notes: String,
    /// Overrides the item's investor flag for this sale.
    pub investor_owned: Option<bool>,
    pub due_date: Option<String>,
    pub phone: Option<String>,
}

impl NewSale {
    pub fn new(
        item_id: impl Into<String>,
        quantity: i64,
        date: impl Into<String>,
        payment: SalePayment,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            unit_price: None,
            date: date.into(),
            customer: String::new(),
            payment,
            notes: String::new(),
            investor_owned: None,
            due_date: None,
            phone: None,
        }
    }
}

pub struct SalesService;

impl SalesService {
    /// Validates stock, records the sale, decrements stock and opens a customer
    /// credit when the sale is on credit.
    pub fn record_sale(
        book: &mut Book,
        store: &dyn RecordStore,
        input: NewSale,
    ) -> Result<Sale, CoreError> {
        if input.quantity <= 0 {
            return Err(CoreError::Validation(
                "sale quantity must be at least 1".into(),
            ));
        }
        let item = book
            .item_mut(&input.item_id)
            .ok_or_else(|| CoreError::ItemNotFound(input.item_id.clone()))?;
        if item.stock < input.quantity {
            return Err(CoreError::InsufficientStock {
                item: item.name.clone(),
                requested: input.quantity,
                available: item.stock,
            });
        }

        let unit_price = input
            .unit_price
            .filter(|price| price.is_finite() && *price > 0.0)
            .unwrap_or(item.price);
        let sale = Sale {
            id: new_id(),
            date: input.date,
            item_id: item.id.clone(),
            quantity: input.quantity as f64,
            unit_price,
            cost_at_sale: item.cost,
            customer: input.customer.trim().to_string(),
            payment: input.payment.label().to_string(),
            notes: input.notes,
            inv: Some(input.investor_owned.unwrap_or_else(|| item.is_investor_stock())),
        };
        item.stock -= input.quantity;
        let new_stock = item.stock;

        let credit = (input.payment == SalePayment::Credit).then(|| {
            let debtor = if sale.customer.is_empty() {
                DebtorKind::Customer.placeholder_name()
            } else {
                sale.customer.as_str()
            };
            let mut credit =
                DebtRecord::new(debtor, sale.date.clone(), sale.total()).with_source(&sale.id);
            credit.due_date = input.due_date;
            credit.phone = input.phone.filter(|phone| !phone.trim().is_empty());
            credit.notes = sale.notes.clone();
            credit
        });

        book.sales.push(sale.clone());
        if let Some(credit) = &credit {
            book.customer_credits.push(credit.clone());
        }
        tracing::info!(
            sale_id = %sale.id,
            item_id = %sale.item_id,
            quantity = sale.quantity,
            total = sale.total(),
            payment = %sale.payment,
            "recorded sale"
        );

        let mut writes = WriteLog::new();
        writes.record(
            Table::Sales,
            &sale.id,
            insert_record(store, Table::Sales, &sale),
        );
        writes.record(
            Table::Inventory,
            &sale.item_id,
            store.update_field(Table::Inventory, &sale.item_id, field("stock", new_stock)),
        );
        if let Some(credit) = &credit {
            writes.record(
                Table::CustomerCredits,
                &credit.id,
                insert_account_record(store, Table::CustomerCredits, DebtorKind::Customer, credit),
            );
        }
        writes.finish()?;
        Ok(sale)
    }
}
