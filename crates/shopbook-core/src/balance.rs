//! Outstanding balances for customer and supplier credits.

use shopbook_domain::{names_match, DebtRecord};

/// `total - paid`. Malformed fields were already coerced to `0` when the row was decoded.
pub fn outstanding_balance(record: &DebtRecord) -> f64 {
    record.total - record.paid
}

/// Sum of outstanding balances across every record of one debtor.
///
/// Overpaid records contribute their negative balance.
pub fn open_balance(records: &[DebtRecord], debtor_name: &str) -> f64 {
    records
        .iter()
        .filter(|record| names_match(&record.debtor_name, debtor_name))
        .map(outstanding_balance)
        .sum()
}
