//! FIFO settlement of customer and supplier payments against open credits.

use shopbook_domain::{
    new_id, normalize_method, Allocation, Book, DebtRecord, DebtorKind, PaymentRecord, Table,
};

use crate::{
    balance::{open_balance, outstanding_balance},
    storage::{field, insert_account_record, RecordStore, WriteLog},
    CoreError,
};

/// A payment as entered by the user, before it is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub debtor_name: String,
    pub amount: f64,
    pub date: String,
    pub notes: String,
    pub method: String,
}

impl PaymentRequest {
    pub fn new(
        debtor_name: impl Into<String>,
        amount: f64,
        date: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            debtor_name: debtor_name.into(),
            amount,
            date: date.into(),
            notes: String::new(),
            method: method.into(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Result of one settlement, suitable for building a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementOutcome {
    /// Amount actually allocated to open debts. May be less than the logged payment.
    pub applied: f64,
    /// The logged payment; `None` only when the request was a no-op.
    pub payment: Option<PaymentRecord>,
    pub balance_before: f64,
    pub balance_after: f64,
    pub allocations: Vec<Allocation>,
}

impl SettlementOutcome {
    fn no_op() -> Self {
        Self {
            applied: 0.0,
            payment: None,
            balance_before: 0.0,
            balance_after: 0.0,
            allocations: Vec::new(),
        }
    }

    /// Part of the logged payment that found no open debt.
    pub fn unapplied(&self) -> f64 {
        self.payment
            .as_ref()
            .map_or(0.0, |payment| payment.amount - self.applied)
    }
}

pub struct SettlementService;

impl SettlementService {
    /// Applies a customer payment to the customer's oldest open credits first.
    pub fn settle_customer(
        book: &mut Book,
        store: &dyn RecordStore,
        request: &PaymentRequest,
    ) -> Result<SettlementOutcome, CoreError> {
        Self::settle(book, store, DebtorKind::Customer, request)
    }

    /// Applies a payment to a supplier's oldest open credits first.
    pub fn settle_supplier(
        book: &mut Book,
        store: &dyn RecordStore,
        request: &PaymentRequest,
    ) -> Result<SettlementOutcome, CoreError> {
        Self::settle(book, store, DebtorKind::Supplier, request)
    }

    /// Mutates the in-memory book, then mirrors every touched row to the store.
    ///
    /// Store failures are returned after all writes were attempted; the book keeps
    /// its mutated state either way.
    pub fn settle(
        book: &mut Book,
        store: &dyn RecordStore,
        kind: DebtorKind,
        request: &PaymentRequest,
    ) -> Result<SettlementOutcome, CoreError> {
        let (debts, payments) = book.accounts_mut(kind);
        let outcome = Self::allocate(debts, request);
        let Some(payment) = outcome.payment.clone() else {
            return Ok(outcome);
        };
        payments.push(payment.clone());

        let mut writes = WriteLog::new();
        let credits_table = Table::credits_for(kind);
        for slice in &outcome.allocations {
            let paid = debts
                .iter()
                .find(|debt| debt.id == slice.debt_id)
                .map_or(0.0, |debt| debt.paid);
            writes.record(
                credits_table,
                &slice.debt_id,
                store.update_field(credits_table, &slice.debt_id, field("paid", paid)),
            );
        }
        let payments_table = Table::payments_for(kind);
        writes.record(
            payments_table,
            &payment.id,
            insert_account_record(store, payments_table, kind, &payment),
        );
        writes.finish()?;
        Ok(outcome)
    }

    /// The FIFO walk over one debt collection. Performs no I/O.
    ///
    /// A non-finite or non-positive amount leaves `debts` untouched and yields no payment.
    pub fn allocate(debts: &mut [DebtRecord], request: &PaymentRequest) -> SettlementOutcome {
        let amount = request.amount;
        if !amount.is_finite() || amount <= 0.0 {
            tracing::debug!(
                debtor = %request.debtor_name,
                amount,
                "ignoring non-positive settlement"
            );
            return SettlementOutcome::no_op();
        }

        let debtor_name = request.debtor_name.trim();
        let balance_before = open_balance(debts, debtor_name);

        let mut open: Vec<usize> = debts
            .iter()
            .enumerate()
            .filter(|(_, debt)| debt.belongs_to(debtor_name) && outstanding_balance(debt) > 0.0)
            .map(|(index, _)| index)
            .collect();
        // Stable: equal dates keep collection order.
        open.sort_by(|left, right| debts[*left].date.cmp(&debts[*right].date));

        let mut remaining = amount;
        let mut allocations = Vec::new();
        for index in open {
            if remaining <= 0.0 {
                break;
            }
            let debt = &mut debts[index];
            let balance = outstanding_balance(debt);
            if balance <= 0.0 {
                continue;
            }
            let pay = balance.min(remaining);
            debt.paid += pay;
            remaining -= pay;
            tracing::debug!(debt_id = %debt.id, date = %debt.date, pay, remaining, "allocated");
            allocations.push(Allocation {
                debt_id: debt.id.clone(),
                date: debt.date.clone(),
                applied: pay,
                remaining: outstanding_balance(debt),
            });
        }

        let applied = amount - remaining;
        let balance_after = open_balance(debts, debtor_name);
        tracing::info!(
            debtor = debtor_name,
            requested = amount,
            applied,
            debts_touched = allocations.len(),
            "settled payment"
        );

        let payment = PaymentRecord {
            id: new_id(),
            debtor_name: debtor_name.to_string(),
            date: request.date.clone(),
            amount,
            method: normalize_method(&request.method),
            notes: request.notes.clone(),
            balance_before,
            balance_after,
            breakdown: allocations.clone(),
        };

        SettlementOutcome {
            applied,
            payment: Some(payment),
            balance_before,
            balance_after,
            allocations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debt(id: &str, name: &str, date: &str, total: f64, paid: f64) -> DebtRecord {
        let mut record = DebtRecord::new(name, date, total);
        record.id = id.to_string();
        record.paid = paid;
        record
    }

    #[test]
    fn allocation_skips_other_debtors_and_settled_debts() {
        let mut debts = vec![
            debt("a", "Ana", "2024-01-01", 100.0, 100.0),
            debt("b", "Luis", "2023-01-01", 100.0, 0.0),
            debt("c", "ana", "2024-03-01", 100.0, 0.0),
        ];
        let outcome = SettlementService::allocate(
            &mut debts,
            &PaymentRequest::new("ANA", 40.0, "2024-04-01", "efectivo"),
        );
        assert_eq!(outcome.applied, 40.0);
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.allocations[0].debt_id, "c");
        assert_eq!(debts[1].paid, 0.0);
        let payment = outcome.payment.expect("payment logged");
        assert_eq!(payment.method, "Efectivo");
        assert_eq!(payment.balance_before, 100.0);
        assert_eq!(payment.balance_after, 60.0);
    }

    #[test]
    fn missing_dates_are_settled_first() {
        let mut debts = vec![
            debt("dated", "Ana", "2024-01-01", 50.0, 0.0),
            debt("undated", "Ana", "", 50.0, 0.0),
        ];
        let outcome = SettlementService::allocate(
            &mut debts,
            &PaymentRequest::new("Ana", 50.0, "2024-04-01", "Efectivo"),
        );
        assert_eq!(outcome.allocations[0].debt_id, "undated");
        assert_eq!(debts[0].paid, 0.0);
    }

    #[test]
    fn nan_amount_is_a_no_op() {
        let mut debts = vec![debt("a", "Ana", "2024-01-01", 100.0, 0.0)];
        let outcome = SettlementService::allocate(
            &mut debts,
            &PaymentRequest::new("Ana", f64::NAN, "2024-04-01", "Efectivo"),
        );
        assert!(outcome.payment.is_none());
        assert_eq!(debts[0].paid, 0.0);
    }
}
