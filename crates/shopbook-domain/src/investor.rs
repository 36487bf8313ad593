//! Investor capital account entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvestorEntryKind {
    Contribution,
    Withdrawal,
    Profit,
}

impl InvestorEntryKind {
    pub fn label(self) -> &'static str {
        match self {
            InvestorEntryKind::Contribution => "Aporte",
            InvestorEntryKind::Withdrawal => "Retiro",
            InvestorEntryKind::Profit => "Utilidad",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "aporte" => Some(InvestorEntryKind::Contribution),
            "retiro" => Some(InvestorEntryKind::Withdrawal),
            "utilidad" => Some(InvestorEntryKind::Profit),
            _ => None,
        }
    }
}

impl fmt::Display for InvestorEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestorEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    /// Raw kind label; unknown labels are kept but ignored by summaries.
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
}

impl InvestorEntry {
    pub fn entry_kind(&self) -> Option<InvestorEntryKind> {
        InvestorEntryKind::parse(&self.kind)
    }
}
