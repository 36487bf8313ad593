use serde::{Deserialize, Serialize};

use crate::lenient;

/// A stocked product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub size_ml: i64,
    /// Latest unit cost; refreshed by purchases.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub cost: f64,
    /// List price used when a sale does not quote one.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    /// Stock financed by the investor.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub inv: Option<bool>,
}

impl InventoryItem {
    pub fn is_investor_stock(&self) -> bool {
        self.inv.unwrap_or(false)
    }
}
