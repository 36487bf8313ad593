//! Per-debtor summaries over credit collections.

use std::collections::BTreeMap;

use shopbook_domain::{normalize_name, DebtRecord, DebtorKind};

use crate::balance::outstanding_balance;

#[derive(Debug, Clone, PartialEq)]
pub struct DebtorSummary {
    pub name: String,
    pub total: f64,
    pub paid: f64,
    pub balance: f64,
    pub open_records: usize,
}

pub struct SummaryService;

impl SummaryService {
    /// Groups records by trimmed debtor name, largest balance first.
    ///
    /// Names are grouped case-insensitively; the first spelling seen is displayed.
    /// Blank names fall under the placeholder for `kind`.
    pub fn debtor_summaries(records: &[DebtRecord], kind: DebtorKind) -> Vec<DebtorSummary> {
        let mut groups: BTreeMap<String, DebtorSummary> = BTreeMap::new();
        for record in records {
            let trimmed = record.debtor_name.trim();
            let name = if trimmed.is_empty() {
                kind.placeholder_name()
            } else {
                trimmed
            };
            let summary = groups
                .entry(normalize_name(name))
                .or_insert_with(|| DebtorSummary {
                    name: name.to_string(),
                    total: 0.0,
                    paid: 0.0,
                    balance: 0.0,
                    open_records: 0,
                });
            summary.total += record.total;
            summary.paid += record.paid;
            summary.balance += outstanding_balance(record);
            if outstanding_balance(record) > 0.0 {
                summary.open_records += 1;
            }
        }

        let mut summaries: Vec<DebtorSummary> = groups
            .into_values()
            .filter(|summary| summary.balance > 0.0 || summary.total > 0.0)
            .collect();
        summaries.sort_by(|left, right| {
            right
                .balance
                .total_cmp(&left.balance)
                .then_with(|| normalize_name(&left.name).cmp(&normalize_name(&right.name)))
        });
        summaries
    }

    /// Sum of outstanding balances across debtors with something still owed.
    pub fn total_receivable(summaries: &[DebtorSummary]) -> f64 {
        summaries
            .iter()
            .map(|summary| summary.balance.max(0.0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_case_insensitively_and_orders_by_balance() {
        let mut settled = DebtRecord::new("Zoe", "2024-01-01", 100.0);
        settled.paid = 100.0;
        let records = vec![
            DebtRecord::new("ana", "2024-01-01", 100.0),
            DebtRecord::new(" Ana ", "2024-01-02", 50.0),
            DebtRecord::new("Luis", "2024-01-03", 300.0),
            DebtRecord::new("", "2024-01-04", 20.0),
            settled,
            DebtRecord::new("Nadie", "2024-01-05", 0.0),
        ];
        let summaries = SummaryService::debtor_summaries(&records, DebtorKind::Customer);
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Luis", "ana", "Cliente", "Zoe"]);
        assert_eq!(summaries[1].balance, 150.0);
        assert_eq!(summaries[1].open_records, 2);
        assert_eq!(SummaryService::total_receivable(&summaries), 470.0);
    }
}
