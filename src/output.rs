//! Plain-text rendering of bookkeeping results for the terminal.

use colored::Colorize;
use shopbook_core::{Balances, DebtorSummary, InvestorSummary, ProfitReport, SettlementOutcome};
use shopbook_domain::{format_cop, Direction, InventoryItem, Movement};

pub fn money(amount: f64) -> String {
    let text = format_cop(amount);
    if amount < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

pub fn heading(title: &str) -> String {
    title.bold().to_string()
}

pub fn settlement(kind_label: &str, name: &str, outcome: &SettlementOutcome) -> String {
    let Some(payment) = &outcome.payment else {
        return "Nothing to record: amount must be greater than zero".to_string();
    };
    let mut lines = vec![
        heading(&format!("Payment {} ({kind_label})", payment.id)),
        format!("  Debtor:         {name}"),
        format!("  Method:         {}", payment.method),
        format!("  Recorded:       {}", money(payment.amount)),
        format!("  Applied:        {}", money(outcome.applied)),
        format!("  Balance before: {}", money(outcome.balance_before)),
        format!("  Balance after:  {}", money(outcome.balance_after)),
    ];
    if outcome.unapplied() > 0.0 {
        lines.push(
            format!("  Unapplied:      {}", money(outcome.unapplied()))
                .yellow()
                .to_string(),
        );
    }
    for slice in &outcome.allocations {
        lines.push(format!(
            "    {} {:<12} {} -> remaining {}",
            slice.date,
            slice.debt_id,
            money(slice.applied),
            money(slice.remaining)
        ));
    }
    lines.join("\n")
}

pub fn ledger(movements: &[Movement]) -> String {
    if movements.is_empty() {
        return "No movements".to_string();
    }
    movements
        .iter()
        .map(|movement| {
            let sign = match movement.direction {
                Direction::Inflow => "+",
                Direction::Outflow => "-",
            };
            format!(
                "{:<10}  {:<5}  {sign}{:>14}  {}  {}",
                movement.date,
                movement.medium,
                format_cop(movement.amount),
                movement.concept,
                movement.counterparty
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn balances(balances: &Balances) -> String {
    format!(
        "Caja:  {}\nBanco: {}\nTotal: {}",
        money(balances.cash),
        money(balances.bank),
        money(balances.total())
    )
}

pub fn debtors(summaries: &[DebtorSummary]) -> String {
    if summaries.is_empty() {
        return "No open accounts".to_string();
    }
    summaries
        .iter()
        .map(|summary| {
            format!(
                "{:<24} total {:>14}  paid {:>14}  balance {}",
                summary.name,
                format_cop(summary.total),
                format_cop(summary.paid),
                money(summary.balance)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn items(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "Inventory is empty".to_string();
    }
    items
        .iter()
        .map(|item| {
            let investor = if item.is_investor_stock() { " [INV]" } else { "" };
            format!(
                "{}  {} {} {}ml  stock {}  cost {}  price {}{investor}",
                item.id,
                item.name,
                item.brand,
                item.size_ml,
                item.stock,
                format_cop(item.cost),
                format_cop(item.price)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profit(report: &ProfitReport, investor: &InvestorSummary) -> String {
    [
        heading("Profit report"),
        format!("  Sales:            {}", report.sales_count),
        format!("  Revenue:          {}", money(report.revenue)),
        format!("  Cost:             {}", money(report.cost)),
        format!("  Profit:           {}", money(report.profit)),
        format!("  Margin:           {:.1}%", report.margin_percent),
        format!(
            "  Investor sales:   {} ({})",
            report.investor_sales_count,
            money(report.investor_revenue)
        ),
        format!("  Investor profit:  {}", money(report.investor_profit)),
        format!(
            "  Investor cut:     {} ({:.0}%)",
            money(report.investor_cut),
            report.investor_share_percent
        ),
        format!("  Owner cut:        {}", money(report.owner_cut)),
        format!("  Net capital:      {}", money(investor.net_capital)),
    ]
    .join("\n")
}
