//! Bounds of the SQL columns request values end up in.

use rust_decimal::Decimal;

/// Largest value of a `NUMERIC(10,2)` column, 99_999_999.99
pub(crate) const NUMERIC_10_2_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// `value` is stored as given by a column with `scale` fractional digits whose largest value is `max`.
pub(crate) fn fits_numeric(value: Decimal, scale: u32, max: Decimal) -> bool {
    value.normalize().scale() <= scale && value.abs() <= max
}

/// `VARCHAR(max_len)` counts characters, not bytes.
pub(crate) fn fits_varchar(value: &str, max_len: usize) -> bool {
    value.chars().count() <= max_len
}
