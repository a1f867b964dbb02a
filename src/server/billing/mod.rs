//! GST-aware bill computation and request validation

pub(crate) mod calculator;
pub(crate) mod validation;

use rust_decimal::Decimal;

/// GST rate applied when a line item does not carry one, in percent.
pub(crate) const DEFAULT_GST_RATE: Decimal = Decimal::from_parts(1800, 0, 0, false, 2);

/// One purchased product entry of a bill, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineItem {
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    /// percentage, e.g. 18.00
    pub gst_rate: Decimal,
}

/// A bill that passed validation and is ready to be priced and recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewBill {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub items: Vec<LineItem>,
}
