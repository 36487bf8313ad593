//! shopbook-domain
//!
//! Pure record types for the shop's books (credits, payments, sales, purchases,
//! inventory, investor entries and derived cash/bank movements).
//! No I/O, no CLI, no storage. Only data types, coercion helpers and core enums.

pub mod book;
pub mod common;
pub mod debt;
pub mod inventory;
pub mod investor;
pub mod lenient;
pub mod money;
pub mod movement;
pub mod payment;
pub mod purchase;
pub mod sale;

pub use book::*;
pub use common::*;
pub use debt::*;
pub use inventory::*;
pub use investor::*;
pub use money::*;
pub use movement::*;
pub use payment::*;
pub use purchase::*;
pub use sale::*;
