//! Inventory purchases and operating expenses.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// A purchase paid in cash/bank (`cash_method` set) or on supplier credit.
///
/// Operating expenses reuse the same shape with an empty `item_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchase {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub item_id: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub unit_cost: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub supplier: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub invoice: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub cash_method: Option<String>,
}

impl Purchase {
    /// Quantity used for totals; a zero quantity counts as a single unit.
    pub fn billed_quantity(&self) -> i64 {
        if self.quantity == 0 {
            1
        } else {
            self.quantity
        }
    }

    pub fn total(&self) -> f64 {
        self.billed_quantity() as f64 * self.unit_cost
    }

    pub fn is_operating_expense(&self) -> bool {
        self.item_id.trim().is_empty()
    }
}
