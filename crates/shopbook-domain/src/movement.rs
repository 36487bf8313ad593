//! Derived cash/bank ledger entries. Never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payment::PaymentMethod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Inflow,
    Outflow,
}

impl Direction {
    /// `+1` for inflows, `-1` for outflows.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Inflow => 1.0,
            Direction::Outflow => -1.0,
        }
    }
}

/// Where the money sits: the cash drawer or the bank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Medium {
    Cash,
    Bank,
}

impl Medium {
    /// Cash only for `"Efectivo"`; every other method string settles through the bank.
    pub fn for_method(normalized_method: &str) -> Self {
        if normalized_method == PaymentMethod::Cash.label() {
            Medium::Cash
        } else {
            Medium::Bank
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Medium::Cash => "Caja",
            Medium::Bank => "Banco",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MovementCategory {
    Sale,
    CustomerPayment,
    CashPurchase,
    SupplierPayment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub date: String,
    pub direction: Direction,
    pub medium: Medium,
    pub category: MovementCategory,
    /// Human readable concept, e.g. `"Venta — Efectivo"`.
    pub concept: String,
    pub counterparty: String,
    pub amount: f64,
}

impl Movement {
    /// Amount with the direction's sign applied.
    pub fn signed_amount(&self) -> f64 {
        self.direction.sign() * self.amount
    }
}
