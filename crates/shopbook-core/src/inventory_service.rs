use shopbook_domain::{new_id, normalize_name, Book, InventoryItem, Table};

use crate::{
    storage::{insert_record, RecordStore},
    CoreError,
};

/// Input for [`InventoryService::add_item`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub brand: String,
    pub size_ml: i64,
    pub cost: f64,
    pub price: f64,
    pub stock: i64,
    pub notes: String,
    pub investor_owned: bool,
}

pub struct InventoryService;

impl InventoryService {
    pub fn add_item(
        book: &mut Book,
        store: &dyn RecordStore,
        input: NewItem,
    ) -> Result<InventoryItem, CoreError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("item name cannot be empty".into()));
        }
        if input.stock < 0 {
            return Err(CoreError::Validation("initial stock cannot be negative".into()));
        }
        let item = InventoryItem {
            id: new_id(),
            name: name.to_string(),
            brand: input.brand.trim().to_string(),
            size_ml: input.size_ml,
            cost: input.cost,
            price: input.price,
            stock: input.stock,
            notes: input.notes,
            inv: Some(input.investor_owned),
        };
        book.inventory.push(item.clone());
        tracing::info!(item_id = %item.id, name = %item.name, stock = item.stock, "added item");
        insert_record(store, Table::Inventory, &item)?;
        Ok(item)
    }

    /// Items ordered by case-insensitive name.
    pub fn list(book: &Book) -> Vec<&InventoryItem> {
        let mut items: Vec<&InventoryItem> = book.inventory.iter().collect();
        items.sort_by_key(|item| normalize_name(&item.name));
        items
    }

    /// Total value of stock at cost.
    pub fn stock_value(book: &Book) -> f64 {
        book.inventory
            .iter()
            .map(|item| item.stock.max(0) as f64 * item.cost)
            .sum()
    }
}
