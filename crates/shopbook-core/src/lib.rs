//! shopbook-core
//!
//! Bookkeeping logic for the shop: FIFO settlement of credits, the derived
//! cash/bank ledger, recording services and reports.
//! Depends on shopbook-domain. No CLI, no terminal I/O; persistence goes through [`RecordStore`].

pub mod balance;
pub mod error;
pub mod inventory_service;
pub mod investor_service;
pub mod ledger_service;
pub mod memory_store;
pub mod purchase_service;
pub mod report_service;
pub mod sales_service;
pub mod settlement_service;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use balance::*;
pub use error::CoreError;
pub use inventory_service::*;
pub use investor_service::*;
pub use ledger_service::*;
pub use memory_store::MemoryStore;
pub use purchase_service::*;
pub use report_service::*;
pub use sales_service::*;
pub use settlement_service::*;
pub use storage::{load_book, FieldUpdates, RecordStore};
pub use summary_service::*;
