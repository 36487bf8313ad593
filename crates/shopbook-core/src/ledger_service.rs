//! Cash/bank ledger derived from sales, purchases and debt payments.

use shopbook_domain::{
    date_in_range, normalize_method, Book, Direction, Medium, Movement, MovementCategory,
    PaymentMethod, PaymentRecord, Purchase, Sale,
};

/// Cash and bank totals computed from a list of movements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Balances {
    pub cash: f64,
    pub bank: f64,
}

impl Balances {
    pub fn total(&self) -> f64 {
        self.cash + self.bank
    }
}

impl From<Balances> for (f64, f64) {
    fn from(balances: Balances) -> Self {
        (balances.cash, balances.bank)
    }
}

pub struct LedgerService;

impl LedgerService {
    /// Builds every cash/bank movement, ascending by date.
    ///
    /// Equal dates keep scan order: sales, customer payments, purchases,
    /// supplier payments, each in collection order.
    pub fn build_ledger(
        sales: &[Sale],
        customer_payments: &[PaymentRecord],
        purchases: &[Purchase],
        supplier_payments: &[PaymentRecord],
    ) -> Vec<Movement> {
        let mut movements = Vec::new();

        for sale in sales {
            let method = normalize_method(&sale.payment);
            if PaymentMethod::parse(&method).is_none() {
                continue;
            }
            movements.push(Movement {
                date: sale.date.clone(),
                direction: Direction::Inflow,
                medium: Medium::for_method(&method),
                category: MovementCategory::Sale,
                concept: format!("Venta — {method}"),
                counterparty: sale.customer.clone(),
                amount: sale.total(),
            });
        }

        for payment in customer_payments {
            movements.push(Self::payment_movement(
                payment,
                Direction::Inflow,
                MovementCategory::CustomerPayment,
                "Abono cliente",
            ));
        }

        for purchase in purchases {
            let method = purchase
                .cash_method
                .as_deref()
                .map(normalize_method)
                .unwrap_or_default();
            if method.is_empty() {
                continue;
            }
            let concept = if purchase.is_operating_expense() {
                "Gasto operativo"
            } else {
                "Compra inventario"
            };
            movements.push(Movement {
                date: purchase.date.clone(),
                direction: Direction::Outflow,
                medium: Medium::for_method(&method),
                category: MovementCategory::CashPurchase,
                concept: format!("{concept} — {method}"),
                counterparty: purchase.supplier.clone(),
                amount: purchase.total(),
            });
        }

        for payment in supplier_payments {
            movements.push(Self::payment_movement(
                payment,
                Direction::Outflow,
                MovementCategory::SupplierPayment,
                "Pago a proveedor",
            ));
        }

        movements.sort_by(|left, right| left.date.cmp(&right.date));
        movements
    }

    /// [`LedgerService::build_ledger`] over the collections of a book.
    pub fn book_ledger(book: &Book) -> Vec<Movement> {
        Self::build_ledger(
            &book.sales,
            &book.customer_payments,
            &book.purchases,
            &book.supplier_payments,
        )
    }

    /// Sums movements into cash and bank balances. Negative results are kept.
    pub fn balances(movements: &[Movement]) -> Balances {
        movements
            .iter()
            .fold(Balances::default(), |mut balances, movement| {
                match movement.medium {
                    Medium::Cash => balances.cash += movement.signed_amount(),
                    Medium::Bank => balances.bank += movement.signed_amount(),
                }
                balances
            })
    }

    /// Movements dated within `[from, to]`, both bounds optional and inclusive.
    pub fn filter_movements(
        movements: &[Movement],
        from: Option<&str>,
        to: Option<&str>,
    ) -> Vec<Movement> {
        movements
            .iter()
            .filter(|movement| date_in_range(&movement.date, from, to))
            .cloned()
            .collect()
    }

    fn payment_movement(
        payment: &PaymentRecord,
        direction: Direction,
        category: MovementCategory,
        concept: &str,
    ) -> Movement {
        let method = normalize_method(&payment.method);
        Movement {
            date: payment.date.clone(),
            direction,
            medium: Medium::for_method(&method),
            category,
            concept: format!("{concept} — {method}"),
            counterparty: payment.debtor_name.clone(),
            amount: payment.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale(date: &str, payment: &str, quantity: f64, unit_price: f64) -> Sale {
        serde_json::from_value(json!({
            "id": format!("s-{date}-{payment}"),
            "date": date,
            "item_id": "i1",
            "quantity": quantity,
            "unit_price": unit_price,
            "customer": "Ana",
            "payment": payment,
        }))
        .expect("sale")
    }

    #[test]
    fn purchases_classify_by_cash_method_and_item() {
        let purchases: Vec<Purchase> = serde_json::from_value(json!([
            {"id": "p1", "date": "2024-01-02", "item_id": "i1", "quantity": 2, "unit_cost": 10, "cash_method": " transferencia"},
            {"id": "p2", "date": "2024-01-03", "item_id": "", "quantity": 0, "unit_cost": 7, "cash_method": "Efectivo"},
            {"id": "p3", "date": "2024-01-04", "item_id": "i1", "quantity": 5, "unit_cost": 10}
        ]))
        .expect("purchases");

        let ledger = LedgerService::build_ledger(&[], &[], &purchases, &[]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].concept, "Compra inventario — Transferencia");
        assert_eq!(ledger[0].medium, Medium::Bank);
        assert_eq!(ledger[0].amount, 20.0);
        assert_eq!(ledger[1].concept, "Gasto operativo — Efectivo");
        assert_eq!(ledger[1].amount, 7.0);

        let balances = LedgerService::balances(&ledger);
        assert_eq!(balances, Balances { cash: -7.0, bank: -20.0 });
    }

    #[test]
    fn sales_with_unknown_methods_are_ignored() {
        let sales = vec![
            sale("2024-01-01", "tarjeta", 1.0, 30.0),
            sale("2024-01-01", "Bitcoin", 1.0, 30.0),
            sale("2024-01-01", "", 1.0, 30.0),
        ];
        let ledger = LedgerService::build_ledger(&sales, &[], &[], &[]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].concept, "Venta — Tarjeta");
        assert_eq!(ledger[0].counterparty, "Ana");
    }

    #[test]
    fn filter_keeps_inclusive_range() {
        let sales = vec![
            sale("2024-01-01", "Efectivo", 1.0, 1.0),
            sale("2024-01-15", "Efectivo", 1.0, 2.0),
            sale("2024-02-01", "Efectivo", 1.0, 3.0),
        ];
        let ledger = LedgerService::build_ledger(&sales, &[], &[], &[]);
        let january =
            LedgerService::filter_movements(&ledger, Some("2024-01-01"), Some("2024-01-31"));
        assert_eq!(january.len(), 2);
        assert_eq!(LedgerService::balances(&january).cash, 3.0);
    }

    #[test]
    fn fractional_sale_quantities_keep_their_full_amount() {
        let sales: Vec<Sale> = serde_json::from_value(json!([
            {"id": "s1", "date": "2024-01-01", "quantity": "1.5", "unit_price": 100000, "payment": "Efectivo"},
            {"id": "s2", "date": "2024-01-02", "quantity": 0.5, "unit_price": "100000", "payment": "Efectivo"}
        ]))
        .expect("sales");

        let ledger = LedgerService::build_ledger(&sales, &[], &[], &[]);
        let amounts: Vec<f64> = ledger.iter().map(|movement| movement.amount).collect();
        assert_eq!(amounts, vec![150_000.0, 50_000.0]);
        assert_eq!(LedgerService::balances(&ledger).cash, 200_000.0);
    }
}
