use chrono::NaiveDate;
use derive_more::{Display, Error};

use crate::server::billing::calculator::InvoiceTotals;
use crate::server::billing::NewBill;
use crate::server::model::bill::{Bill, BillExportRow, BillHistoryEntry};
use crate::server::model::inventory::{InventoryItem, NewInventoryItem, Product};
use crate::server::model::payment::{NewPayment, Payment};
use crate::server::model::pickup::{NewPickup, WastePickup};
use crate::server::model::report::{DashboardStats, SummaryCounts};

#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    #[display("no database connection available")]
    Unavailable,
    #[display("database operation timed out")]
    Timeout,
    #[display("query failed, {_0}")]
    Query(tokio_postgres::Error),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::Query(e)
    }
}

/// Everything the handlers need from persistent storage.
pub(crate) trait Store {
    /// Records the bill header and all its items as one unit; nothing is kept if any insert fails.
    async fn create_bill(&self, bill: &NewBill, totals: &InvoiceTotals) -> Result<Bill, StoreError>;
    async fn get_bill(&self, id: i64) -> Result<Option<Bill>, StoreError>;
    /// newest first
    async fn bill_history(&self, offset: i64, limit: i64) -> Result<Vec<BillHistoryEntry>, StoreError>;
    async fn export_bills(&self) -> Result<Vec<BillExportRow>, StoreError>;

    async fn check_credentials(&self, username: &str, password: &str) -> Result<bool, StoreError>;

    async fn record_payment(&self, payment: &NewPayment) -> Result<i64, StoreError>;
    async fn payment_history(&self, offset: i64, limit: i64) -> Result<Vec<Payment>, StoreError>;

    async fn schedule_pickup(&self, pickup: &NewPickup) -> Result<i64, StoreError>;
    async fn pickup_history(&self, offset: i64, limit: i64) -> Result<Vec<WastePickup>, StoreError>;

    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, StoreError>;
    /// active items with stock left, by name
    async fn billable_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn add_inventory(&self, item: &NewInventoryItem) -> Result<i64, StoreError>;

    async fn summary_counts(&self) -> Result<SummaryCounts, StoreError>;
    async fn dashboard_stats(&self, day: NaiveDate) -> Result<DashboardStats, StoreError>;
}
