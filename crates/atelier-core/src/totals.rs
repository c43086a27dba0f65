//! # Document Totals
//!
//! The totals calculator shared by quotes and invoices.
//!
//! ## Invariants
//! - each line total = quantity × unit price, rounded to the cent once,
//!   at write time
//! - subtotal = Σ line totals (exact integer sum, no float drift)
//! - tax = subtotal × rate, rounded to the cent
//! - total = subtotal + tax
//!
//! Validation of the inputs (at least one line, positive quantity,
//! non-negative price) happens upstream in [`crate::validation`].

use serde::{Deserialize, Serialize};

use crate::money::{Money, Quantity, TaxRate};

/// One validated billable line, ready to be totalled and persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub service_name: String,
    pub description: Option<String>,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl NewLineItem {
    /// The stored line total: quantity × unit price.
    #[inline]
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The derived amounts of a quote or invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
}

/// Computes subtotal, tax, and total for a set of lines at a tax rate.
///
/// ## Example
/// ```rust
/// use atelier_core::money::{Money, Quantity, TaxRate};
/// use atelier_core::totals::{compute, NewLineItem};
///
/// let lines = vec![
///     NewLineItem {
///         service_name: "Conception".into(),
///         description: None,
///         quantity: Quantity::from_hundredths(200),   // 2.00
///         unit_price: Money::from_cents(10000),       // 100.00
///     },
///     NewLineItem {
///         service_name: "Suivi de chantier".into(),
///         description: None,
///         quantity: Quantity::from_hundredths(100),   // 1.00
///         unit_price: Money::from_cents(5000),        // 50.00
///     },
/// ];
///
/// let totals = compute(&lines, TaxRate::from_bps(2000));
/// assert_eq!(totals.subtotal.cents(), 25000);  // 250.00
/// assert_eq!(totals.tax_amount.cents(), 5000); // 50.00
/// assert_eq!(totals.total.cents(), 30000);     // 300.00
/// ```
pub fn compute(lines: &[NewLineItem], tax_rate: TaxRate) -> DocumentTotals {
    let subtotal: Money = lines.iter().map(NewLineItem::total_price).sum();
    let tax_amount = subtotal.calculate_tax(tax_rate);

    DocumentTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity_hundredths: i64, unit_price_cents: i64) -> NewLineItem {
        NewLineItem {
            service_name: "Prestation".to_string(),
            description: None,
            quantity: Quantity::from_hundredths(quantity_hundredths),
            unit_price: Money::from_cents(unit_price_cents),
        }
    }

    #[test]
    fn test_worked_example() {
        // 2 x 100.00 + 1 x 50.00 at 20% -> 250.00 / 50.00 / 300.00
        let lines = vec![line(200, 10000), line(100, 5000)];
        let totals = compute(&lines, TaxRate::from_bps(2000));

        assert_eq!(totals.subtotal, Money::from_cents(25000));
        assert_eq!(totals.tax_amount, Money::from_cents(5000));
        assert_eq!(totals.total, Money::from_cents(30000));
    }

    #[test]
    fn test_no_drift_across_many_lines() {
        // 0.10 summed 100 times must be exactly 10.00; the float version
        // of this sum is famously not.
        let lines: Vec<NewLineItem> = (0..100).map(|_| line(100, 10)).collect();
        let totals = compute(&lines, TaxRate::zero());
        assert_eq!(totals.subtotal, Money::from_cents(1000));
        assert_eq!(totals.total, Money::from_cents(1000));
    }

    #[test]
    fn test_two_decimal_prices_exact_sum() {
        // 3 lines with awkward 2-decimal prices
        let lines = vec![line(100, 3333), line(100, 3333), line(100, 3334)];
        let totals = compute(&lines, TaxRate::from_bps(2000));
        assert_eq!(totals.subtotal, Money::from_cents(10000));
        assert_eq!(totals.tax_amount, Money::from_cents(2000));
        assert_eq!(totals.total, Money::from_cents(12000));
    }

    #[test]
    fn test_tax_and_total_track_rate_changes() {
        let lines = vec![line(100, 10000)];

        let at_ten = compute(&lines, TaxRate::from_bps(1000));
        let at_twenty = compute(&lines, TaxRate::from_bps(2000));

        assert_eq!(at_ten.subtotal, at_twenty.subtotal);
        assert_eq!(at_ten.tax_amount.cents() * 2, at_twenty.tax_amount.cents());
        assert_eq!(at_ten.total, Money::from_cents(11000));
        assert_eq!(at_twenty.total, Money::from_cents(12000));
    }

    #[test]
    fn test_fractional_quantities() {
        // 2.50 x 100.33 = 250.83 (rounded per line, then summed)
        let lines = vec![line(250, 10033)];
        let totals = compute(&lines, TaxRate::zero());
        assert_eq!(totals.subtotal, Money::from_cents(25083));
    }
}
