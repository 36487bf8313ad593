//! Profit and investor share over a date range of sales.

use shopbook_domain::{date_in_range, Book, Sale};

use crate::time::Clock;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfitReport {
    pub sales_count: usize,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub margin_percent: f64,
    pub investor_sales_count: usize,
    pub investor_revenue: f64,
    pub investor_profit: f64,
    pub investor_share_percent: f64,
    pub investor_cut: f64,
    pub owner_cut: f64,
}

/// Revenue, cost and ownership of one sale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleFigures {
    pub revenue: f64,
    pub cost: f64,
    pub investor_owned: bool,
}

pub struct ReportService;

impl ReportService {
    /// Falls back to the item's current cost and investor flag when the sale lacks them.
    pub fn sale_figures(book: &Book, sale: &Sale) -> SaleFigures {
        let item = book.item(&sale.item_id);
        let unit_cost = if sale.cost_at_sale != 0.0 {
            sale.cost_at_sale
        } else {
            item.map_or(0.0, |item| item.cost)
        };
        let investor_owned = sale
            .inv
            .unwrap_or_else(|| item.map_or(false, |item| item.is_investor_stock()));
        SaleFigures {
            revenue: sale.total(),
            cost: sale.quantity * unit_cost,
            investor_owned,
        }
    }

    /// Sales dated within `[from, to]`. `investor_share` is a percentage, clamped to 0..=100.
    pub fn profit_report(
        book: &Book,
        from: Option<&str>,
        to: Option<&str>,
        investor_share: f64,
    ) -> ProfitReport {
        let share = if investor_share.is_finite() {
            investor_share.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let mut report = ProfitReport {
            investor_share_percent: share,
            ..ProfitReport::default()
        };
        for sale in book
            .sales
            .iter()
            .filter(|sale| date_in_range(&sale.date, from, to))
        {
            let figures = Self::sale_figures(book, sale);
            report.sales_count += 1;
            report.revenue += figures.revenue;
            report.cost += figures.cost;
            if figures.investor_owned {
                report.investor_sales_count += 1;
                report.investor_revenue += figures.revenue;
                report.investor_profit += figures.revenue - figures.cost;
            }
        }
        report.profit = report.revenue - report.cost;
        report.margin_percent = if report.revenue > 0.0 {
            report.profit / report.revenue * 100.0
        } else {
            0.0
        };
        report.investor_cut = report.investor_profit * share / 100.0;
        report.owner_cut = report.profit - report.investor_cut;
        report
    }

    /// [`ReportService::profit_report`] for the month containing `clock.today()`.
    pub fn current_month(book: &Book, clock: &dyn Clock, investor_share: f64) -> ProfitReport {
        let (from, to) = clock.current_month();
        Self::profit_report(book, Some(&from), Some(&to), investor_share)
    }
}
