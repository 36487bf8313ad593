#![doc(test(attr(deny(warnings))))]

//! Shopbook keeps the books of a small shop: credit sales and supplier
//! credit settled oldest-first, a cash/bank ledger derived from every
//! recorded flow, inventory and investor capital.

pub mod bookkeeper;
pub mod cli;
pub mod errors;
pub mod output;
pub mod utils;

pub use bookkeeper::Bookkeeper;
pub use errors::AppError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Shopbook tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
