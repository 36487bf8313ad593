//! Payment methods and the payment records written by settlements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Label for a sale taken on customer credit.
pub const CREDIT_LABEL: &str = "Fiado";

/// Enumerates how money changed hands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[serde(rename = "Efectivo")]
    Cash,
    #[serde(rename = "Transferencia")]
    Transfer,
    #[serde(rename = "Tarjeta")]
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::Card,
    ];

    /// The label persisted in rows.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Card => "Tarjeta",
        }
    }

    /// Recognizes a persisted label after trimming and title-casing.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_method(raw);
        Self::ALL
            .into_iter()
            .find(|method| method.label() == normalized)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trims and title-cases a method string (`" tarjeta "` becomes `"Tarjeta"`).
///
/// A letter is upper-cased when it follows a non-letter and lower-cased otherwise.
pub fn normalize_method(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut previous_is_letter = false;
    for ch in raw.trim().chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                normalized.extend(ch.to_lowercase());
            } else {
                normalized.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            normalized.push(ch);
            previous_is_letter = false;
        }
    }
    normalized
}

/// One slice of a payment applied to a single debt record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub debt_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub applied: f64,
    /// Outstanding balance of the debt after this slice.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub remaining: f64,
}

/// A customer or supplier payment, written once per settlement call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
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
    /// The requested amount, which may exceed what was applied to debts.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub method: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub balance_before: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub balance_after: f64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub breakdown: Vec<Allocation>,
}

impl PaymentRecord {
    /// Sum of the persisted allocation slices.
    pub fn applied_total(&self) -> f64 {
        self.breakdown.iter().map(|slice| slice.applied).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_like_title_case() {
        assert_eq!(normalize_method("  efectivo "), "Efectivo");
        assert_eq!(normalize_method("TRANSFERENCIA"), "Transferencia");
        assert_eq!(normalize_method("tarjeta débito"), "Tarjeta Débito");
        assert_eq!(normalize_method(""), "");
    }

    #[test]
    fn parses_known_labels_only() {
        assert_eq!(PaymentMethod::parse("efectivo"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("Tarjeta"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("Fiado"), None);
    }

    #[test]
    fn decodes_legacy_customer_payment_rows() {
        let row = json!({
            "id": "p1",
            "customer": "Ana",
            "date": "2024-03-01",
            "amount": "25000",
            "method": "Efectivo",
            "breakdown": [{"debt_id": "c1", "applied": 25000, "remaining": 0}, "junk"]
        });
        let payment: PaymentRecord = serde_json::from_value(row).expect("decode payment");
        assert_eq!(payment.debtor_name, "Ana");
        assert_eq!(payment.amount, 25_000.0);
        assert_eq!(payment.notes, "");
        assert_eq!(payment.breakdown.len(), 1);
        assert_eq!(payment.applied_total(), 25_000.0);
    }
}
