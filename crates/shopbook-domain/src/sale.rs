//! Sales of inventory items.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{lenient, payment::*};

/// How a sale was paid: immediately through a method, or on customer credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalePayment {
    Paid(PaymentMethod),
    Credit,
}

impl SalePayment {
    pub fn label(self) -> &'static str {
        match self {
            SalePayment::Paid(method) => method.label(),
            SalePayment::Credit => CREDIT_LABEL,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if normalize_method(raw) == CREDIT_LABEL {
            return Some(SalePayment::Credit);
        }
        PaymentMethod::parse(raw).map(SalePayment::Paid)
    }
}

impl fmt::Display for SalePayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub item_id: String,
    /// Kept exactly as coerced; fractional quantities still count toward revenue.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub cost_at_sale: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer: String,
    /// Raw method label; `"Fiado"` marks a credit sale.
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    /// Investor-owned stock; `None` defers to the item's flag.
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub inv: Option<bool>,
}

impl Sale {
    /// Gross revenue of the sale.
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_credit_and_paid_labels() {
        assert_eq!(SalePayment::parse(" fiado"), Some(SalePayment::Credit));
        assert_eq!(
            SalePayment::parse("transferencia"),
            Some(SalePayment::Paid(PaymentMethod::Transfer))
        );
        assert_eq!(SalePayment::parse("bitcoin"), None);
    }
}
