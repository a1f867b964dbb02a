use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct InventoryItem {
    pub id: i64,
    pub product_name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst_rate: Decimal,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// An in-stock, active inventory item offered on the billing screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Product {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddInventoryRequest {
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub gst: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewInventoryItem {
    pub product_name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub gst_rate: Decimal,
}
