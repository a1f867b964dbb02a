use rust_decimal::{Decimal, RoundingStrategy};

use crate::server::billing::LineItem;

/// Round a currency amount to 2 decimal places, half away from zero.
pub(crate) fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl LineItem {
    /// quantity * price
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.price
    }

    pub fn tax(&self) -> Decimal {
        self.subtotal() * self.gst_rate / Decimal::ONE_HUNDRED
    }
}

/// Aggregated amounts of a bill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Accumulates per-item subtotal and tax in input order at full precision.
    pub fn compute(items: &[LineItem]) -> Self {
        let (subtotal, tax) = items
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(subtotal, tax), item| {
                (subtotal + item.subtotal(), tax + item.tax())
            });
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Currency-precision view used at the response and persistence boundary.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_currency(self.subtotal),
            tax: round_currency(self.tax),
            total: round_currency(self.total),
        }
    }
}
