//! Investor capital account.

use shopbook_domain::{new_id, Book, InvestorEntry, InvestorEntryKind, Table};

use crate::{
    storage::{insert_record, RecordStore},
    CoreError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestorEntry {
    pub kind: InvestorEntryKind,
    pub amount: f64,
    pub date: String,
    pub notes: String,
}

/// Totals per entry kind. Entries with an unknown kind are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InvestorSummary {
    pub contributions: f64,
    pub withdrawals: f64,
    pub recorded_profits: f64,
    pub net_capital: f64,
}

pub struct InvestorService;

impl InvestorService {
    pub fn record_entry(
        book: &mut Book,
        store: &dyn RecordStore,
        input: NewInvestorEntry,
    ) -> Result<InvestorEntry, CoreError> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(CoreError::Validation(
                "investor entry amount must be positive".into(),
            ));
        }
        let entry = InvestorEntry {
            id: new_id(),
            date: input.date,
            kind: input.kind.label().to_string(),
            amount: input.amount,
            notes: input.notes,
        };
        book.investor.push(entry.clone());
        tracing::info!(entry_id = %entry.id, kind = %entry.kind, amount = entry.amount, "recorded investor entry");
        insert_record(store, Table::Investor, &entry)?;
        Ok(entry)
    }

    pub fn summary(book: &Book) -> InvestorSummary {
        let mut summary = InvestorSummary::default();
        for entry in &book.investor {
            match entry.entry_kind() {
                Some(InvestorEntryKind::Contribution) => summary.contributions += entry.amount,
                Some(InvestorEntryKind::Withdrawal) => summary.withdrawals += entry.amount,
                Some(InvestorEntryKind::Profit) => summary.recorded_profits += entry.amount,
                None => {}
            }
        }
        summary.net_capital = summary.contributions - summary.withdrawals;
        summary
    }
}
