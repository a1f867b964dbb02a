use derive_more::{Display, Error};
use rust_decimal::Decimal;

use crate::server::billing::calculator::InvoiceTotals;
use crate::server::billing::{LineItem, NewBill, DEFAULT_GST_RATE};
use crate::server::model::bill::{BillItemRequest, CreateBillRequest};

// column widths of the bills / bill_items tables
const MAX_NAME_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 15;
const MAX_PRICE_SCALE: u32 = 2;
const MAX_QUANTITY_SCALE: u32 = 3;
const MAX_RATE_SCALE: u32 = 2;
const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2); // 9_999_999_999.99
const MAX_QUANTITY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 3); // 999_999_999.999
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, 2); // 99_999_999_999_999.99

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub(crate) enum BillValidationError {
    #[display("Customer name and items are required")]
    MissingRequired,
    #[display("customer name must be at most {} characters", MAX_NAME_LEN)]
    CustomerNameTooLong,
    #[display("customer phone must be at most {} characters", MAX_PHONE_LEN)]
    CustomerPhoneTooLong,
    #[display("item {index}: {reason}")]
    InvalidItem { index: usize, reason: &'static str },
    #[display("bill total exceeds the supported range")]
    AmountOutOfRange,
}

impl CreateBillRequest {
    /// Turn the raw request into a typed bill, rejecting anything that can't be priced or stored.
    pub fn validate(self) -> Result<NewBill, BillValidationError> {
        let customer_name = self
            .customer_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let items = self.items.filter(|items| !items.is_empty());
        let (Some(customer_name), Some(items)) = (customer_name, items) else {
            return Err(BillValidationError::MissingRequired);
        };
        if customer_name.chars().count() > MAX_NAME_LEN {
            return Err(BillValidationError::CustomerNameTooLong);
        }

        let customer_phone = self
            .customer_phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());
        if customer_phone.as_ref().is_some_and(|phone| phone.chars().count() > MAX_PHONE_LEN) {
            return Err(BillValidationError::CustomerPhoneTooLong);
        }

        let items = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.validate(i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewBill {
            customer_name,
            customer_phone,
            items,
        })
    }
}

impl BillItemRequest {
    fn validate(self, index: usize) -> Result<LineItem, BillValidationError> {
        let invalid = |reason| BillValidationError::InvalidItem { index, reason };

        let name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| invalid("name is required"))?;
        if name.chars().count() > MAX_NAME_LEN {
            return Err(invalid("name is too long"));
        }

        let quantity = self.quantity.ok_or_else(|| invalid("quantity is required"))?;
        if quantity <= Decimal::ZERO {
            return Err(invalid("quantity must be positive"));
        }
        if quantity.normalize().scale() > MAX_QUANTITY_SCALE || quantity > MAX_QUANTITY {
            return Err(invalid("quantity is out of range"));
        }

        let price = self.price.ok_or_else(|| invalid("price is required"))?;
        if price < Decimal::ZERO {
            return Err(invalid("price must not be negative"));
        }
        if price.normalize().scale() > MAX_PRICE_SCALE || price > MAX_PRICE {
            return Err(invalid("price is out of range"));
        }

        let gst_rate = self.gst.unwrap_or(DEFAULT_GST_RATE);
        if gst_rate < Decimal::ZERO
            || gst_rate > Decimal::ONE_HUNDRED
            || gst_rate.normalize().scale() > MAX_RATE_SCALE
        {
            return Err(invalid("gst rate must be a percentage between 0 and 100"));
        }

        Ok(LineItem {
            name,
            quantity,
            price,
            gst_rate,
        })
    }
}

/// Rounded totals must fit the bills amount columns.
pub(crate) fn check_totals(totals: &InvoiceTotals) -> Result<(), BillValidationError> {
    if totals.total > MAX_AMOUNT {
        return Err(BillValidationError::AmountOutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse(body: serde_json::Value) -> CreateBillRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn bounds_are_what_they_claim() {
        assert_eq!(MAX_PRICE, Decimal::from_str("9999999999.99").unwrap());
        assert_eq!(MAX_QUANTITY, Decimal::from_str("999999999.999").unwrap());
        assert_eq!(MAX_AMOUNT, Decimal::from_str("99999999999999.99").unwrap());
    }

    #[test]
    fn valid_request_becomes_typed_bill() {
        let bill = parse(serde_json::json!({
            "customerName": "  Rajesh Kumar ",
            "customerPhone": "9876543210",
            "items": [
                {"name": "Laptop", "quantity": 1, "price": 45000, "gst": 18},
                {"name": "Mouse", "quantity": "2", "price": "800.00"}
            ]
        }))
        .validate()
        .unwrap();

        assert_eq!(bill.customer_name, "Rajesh Kumar");
        assert_eq!(bill.customer_phone.as_deref(), Some("9876543210"));
        assert_eq!(bill.items.len(), 2);
        assert_eq!(bill.items[1].quantity, Decimal::from(2));
        assert_eq!(bill.items[1].gst_rate, DEFAULT_GST_RATE);
    }

    #[test]
    fn missing_customer_name_is_rejected() {
        let err = parse(serde_json::json!({
            "items": [{"name": "Pen", "quantity": 1, "price": 10}]
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, BillValidationError::MissingRequired);

        let err = parse(serde_json::json!({
            "customerName": "   ",
            "items": [{"name": "Pen", "quantity": 1, "price": 10}]
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, BillValidationError::MissingRequired);
    }

    #[test]
    fn empty_items_are_rejected() {
        for body in [
            serde_json::json!({"customerName": "Amit", "items": []}),
            serde_json::json!({"customerName": "Amit"}),
        ] {
            assert_eq!(
                parse(body).validate().unwrap_err(),
                BillValidationError::MissingRequired
            );
        }
    }

    #[test]
    fn blank_phone_is_dropped() {
        let bill = parse(serde_json::json!({
            "customerName": "Priya",
            "customerPhone": "",
            "items": [{"name": "Lamp", "quantity": 1, "price": 1500}]
        }))
        .validate()
        .unwrap();
        assert_eq!(bill.customer_phone, None);
    }

    #[test]
    fn item_errors_carry_position() {
        let err = parse(serde_json::json!({
            "customerName": "Priya",
            "items": [
                {"name": "Lamp", "quantity": 1, "price": 1500},
                {"name": "Chair", "quantity": 0, "price": 7500}
            ]
        }))
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            BillValidationError::InvalidItem {
                index: 2,
                reason: "quantity must be positive"
            }
        );
        assert_eq!(err.to_string(), "item 2: quantity must be positive");
    }

    #[test]
    fn item_field_rules() {
        let cases = [
            (serde_json::json!({"quantity": 1, "price": 1}), "name is required"),
            (serde_json::json!({"name": "X", "price": 1}), "quantity is required"),
            (serde_json::json!({"name": "X", "quantity": 1}), "price is required"),
            (
                serde_json::json!({"name": "X", "quantity": 1, "price": -1}),
                "price must not be negative",
            ),
            (
                serde_json::json!({"name": "X", "quantity": 1, "price": "1.005"}),
                "price is out of range",
            ),
            (
                serde_json::json!({"name": "X", "quantity": 1, "price": 1, "gst": 101}),
                "gst rate must be a percentage between 0 and 100",
            ),
        ];
        for (item, reason) in cases {
            let err = parse(serde_json::json!({"customerName": "A", "items": [item]}))
                .validate()
                .unwrap_err();
            assert_eq!(err, BillValidationError::InvalidItem { index: 1, reason });
        }
    }

    #[test]
    fn free_items_are_allowed() {
        let bill = parse(serde_json::json!({
            "customerName": "A",
            "items": [{"name": "Sample", "quantity": 1, "price": 0, "gst": 0}]
        }))
        .validate()
        .unwrap();
        assert!(bill.items[0].price.is_zero());
    }

    #[test]
    fn oversized_total_is_rejected() {
        let totals = InvoiceTotals {
            subtotal: MAX_AMOUNT,
            tax: Decimal::ONE,
            total: MAX_AMOUNT + Decimal::ONE,
        };
        assert_eq!(check_totals(&totals), Err(BillValidationError::AmountOutOfRange));
        assert_eq!(check_totals(&InvoiceTotals::default()), Ok(()));
    }
}
