use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::billing::LineItem;

/// Body of `POST /api/create_bill`. Everything is optional here, presence is checked by validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBillRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Option<Vec<BillItemRequest>>,
}

/// Numbers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Deserialize)]
pub(crate) struct BillItemRequest {
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub gst: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateBillResponse {
    pub success: bool,
    pub bill: Bill,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetBillResponse {
    pub success: bool,
    pub bill: Bill,
}

/// A recorded bill together with its items.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Bill {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created_at: String,
    pub items: Vec<BillItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BillItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst: Decimal,
}

impl From<&LineItem> for BillItem {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
            gst: item.gst_rate,
        }
    }
}

/// Row of `GET /api/bill_history`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BillHistoryEntry {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created_at: String,
    pub item_count: i64,
}

/// One bill item joined with its bill header; bills without items yield a single row of `None`s.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BillExportRow {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created_at: String,
    pub item_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub quantity: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub gst_rate: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExportBillsResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<BillExportRow>,
}
