//! In-process store used by handler tests in place of PostgreSQL.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::server::billing::calculator::InvoiceTotals;
use crate::server::billing::NewBill;
use crate::server::database::store::{Store, StoreError};
use crate::server::model::bill::{Bill, BillExportRow, BillHistoryEntry, BillItem};
use crate::server::model::inventory::{InventoryItem, NewInventoryItem, Product};
use crate::server::model::payment::{NewPayment, Payment};
use crate::server::model::pickup::{NewPickup, WastePickup, STATUS_SCHEDULED};
use crate::server::model::report::{DashboardStats, SummaryCounts};
use crate::server::util::time::{day_bounds, format_timestamp, helper};

struct StoredBill {
    id: i64,
    customer_name: String,
    customer_phone: Option<String>,
    totals: InvoiceTotals,
    created_at: DateTime<Utc>,
}

struct StoredItem {
    bill_id: i64,
    item: BillItem,
}

struct StoredPayment {
    payment: Payment,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<(String, String)>,
    bills: Vec<StoredBill>,
    bill_items: Vec<StoredItem>,
    payments: Vec<StoredPayment>,
    pickups: Vec<WastePickup>,
    inventory: Vec<InventoryItem>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    fail_item_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.lock().users.push((username.to_string(), password.to_string()));
        self
    }

    /// every call fails as if no connection could be opened
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// bill item inserts time out after the header is written, which is then rolled back
    pub fn set_fail_item_writes(&self, fail: bool) {
        self.fail_item_writes.store(fail, Ordering::SeqCst);
    }

    pub fn bill_count(&self) -> usize {
        self.lock().bills.len()
    }

    pub fn bill_item_count(&self) -> usize {
        self.lock().bill_items.len()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.lock().payments.iter().map(|p| p.payment.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    fn check(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(self.lock())
    }
}

fn page<T>(rows: impl DoubleEndedIterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    rows.rev().skip(offset as usize).take(limit as usize).collect()
}

impl Store for MemoryStore {
    async fn create_bill(&self, bill: &NewBill, totals: &InvoiceTotals) -> Result<Bill, StoreError> {
        let mut tables = self.check()?;
        let id = tables.bills.len() as i64 + 1;
        let created_at = helper::get_utc_now();
        let items: Vec<BillItem> = bill.items.iter().map(BillItem::from).collect();

        tables.bills.push(StoredBill {
            id,
            customer_name: bill.customer_name.clone(),
            customer_phone: bill.customer_phone.clone(),
            totals: *totals,
            created_at,
        });
        if self.fail_item_writes.load(Ordering::SeqCst) {
            // the item inserts ran out of time, dropping the transaction undoes the header
            tables.bills.pop();
            return Err(StoreError::Timeout);
        }
        tables.bill_items.extend(items.iter().cloned().map(|item| StoredItem { bill_id: id, item }));

        Ok(Bill {
            id,
            customer_name: bill.customer_name.clone(),
            customer_phone: bill.customer_phone.clone(),
            subtotal: totals.subtotal,
            gst: totals.tax,
            total: totals.total,
            created_at: format_timestamp(&created_at),
            items,
        })
    }

    async fn get_bill(&self, id: i64) -> Result<Option<Bill>, StoreError> {
        let tables = self.check()?;
        Ok(tables.bills.iter().find(|b| b.id == id).map(|b| Bill {
            id: b.id,
            customer_name: b.customer_name.clone(),
            customer_phone: b.customer_phone.clone(),
            subtotal: b.totals.subtotal,
            gst: b.totals.tax,
            total: b.totals.total,
            created_at: format_timestamp(&b.created_at),
            items: tables
                .bill_items
                .iter()
                .filter(|i| i.bill_id == id)
                .map(|i| i.item.clone())
                .collect(),
        }))
    }

    async fn bill_history(&self, offset: i64, limit: i64) -> Result<Vec<BillHistoryEntry>, StoreError> {
        let tables = self.check()?;
        let entries = tables.bills.iter().map(|b| BillHistoryEntry {
            id: b.id,
            customer_name: b.customer_name.clone(),
            customer_phone: b.customer_phone.clone(),
            subtotal: b.totals.subtotal,
            gst: b.totals.tax,
            total: b.totals.total,
            created_at: format_timestamp(&b.created_at),
            item_count: tables.bill_items.iter().filter(|i| i.bill_id == b.id).count() as i64,
        });
        Ok(page(entries, offset, limit))
    }

    async fn export_bills(&self) -> Result<Vec<BillExportRow>, StoreError> {
        let tables = self.check()?;
        let mut rows = Vec::new();
        for b in tables.bills.iter().rev() {
            let header = |item: Option<&BillItem>| BillExportRow {
                id: b.id,
                customer_name: b.customer_name.clone(),
                customer_phone: b.customer_phone.clone(),
                subtotal: b.totals.subtotal,
                gst: b.totals.tax,
                total: b.totals.total,
                created_at: format_timestamp(&b.created_at),
                item_name: item.map(|i| i.name.clone()),
                quantity: item.map(|i| i.quantity),
                price: item.map(|i| i.price),
                gst_rate: item.map(|i| i.gst),
            };
            let items: Vec<&BillItem> = tables
                .bill_items
                .iter()
                .filter(|i| i.bill_id == b.id)
                .map(|i| &i.item)
                .collect();
            if items.is_empty() {
                rows.push(header(None));
            }
            rows.extend(items.into_iter().map(|item| header(Some(item))));
        }
        Ok(rows)
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let tables = self.check()?;
        Ok(tables.users.iter().any(|(u, p)| u == username && p == password))
    }

    async fn record_payment(&self, payment: &NewPayment) -> Result<i64, StoreError> {
        let mut tables = self.check()?;
        let id = tables.payments.len() as i64 + 1;
        let now = helper::get_utc_now();
        tables.payments.push(StoredPayment {
            payment: Payment {
                id,
                transaction_id: payment.transaction_id.clone(),
                amount: payment.amount,
                status: payment.status.to_string(),
                verified_at: Some(format_timestamp(&now)),
                created_at: format_timestamp(&now),
            },
            created_at: now,
        });
        Ok(id)
    }

    async fn payment_history(&self, offset: i64, limit: i64) -> Result<Vec<Payment>, StoreError> {
        let tables = self.check()?;
        Ok(page(tables.payments.iter().map(|p| p.payment.clone()), offset, limit))
    }

    async fn schedule_pickup(&self, pickup: &NewPickup) -> Result<i64, StoreError> {
        let mut tables = self.check()?;
        let id = tables.pickups.len() as i64 + 1;
        tables.pickups.push(WastePickup {
            id,
            waste_type: pickup.waste_type.clone(),
            quantity: pickup.quantity,
            pickup_date: pickup.pickup_date,
            status: STATUS_SCHEDULED.to_string(),
            scheduled_at: format_timestamp(&helper::get_utc_now()),
        });
        Ok(id)
    }

    async fn pickup_history(&self, offset: i64, limit: i64) -> Result<Vec<WastePickup>, StoreError> {
        let tables = self.check()?;
        Ok(page(tables.pickups.iter().cloned(), offset, limit))
    }

    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let tables = self.check()?;
        Ok(tables.inventory.iter().rev().cloned().collect())
    }

    async fn billable_products(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.check()?;
        let mut products: Vec<Product> = tables
            .inventory
            .iter()
            .filter(|i| i.status == "Active" && i.stock > 0)
            .map(|i| Product {
                id: i.id,
                name: i.product_name.clone(),
                price: i.price,
                category: i.category.clone(),
                gst: i.gst_rate,
            })
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn add_inventory(&self, item: &NewInventoryItem) -> Result<i64, StoreError> {
        let mut tables = self.check()?;
        let id = tables.inventory.len() as i64 + 1;
        let now = format_timestamp(&helper::get_utc_now());
        tables.inventory.push(InventoryItem {
            id,
            product_name: item.product_name.clone(),
            category: item.category.clone(),
            price: item.price,
            stock: item.stock,
            description: item.description.clone(),
            gst_rate: item.gst_rate,
            status: "Active".to_string(),
            created_at: now.clone(),
            updated_at: now,
        });
        Ok(id)
    }

    async fn summary_counts(&self) -> Result<SummaryCounts, StoreError> {
        let tables = self.check()?;
        Ok(SummaryCounts {
            total_revenue: tables.bills.iter().map(|b| b.totals.total).sum::<Decimal>(),
            total_transactions: tables.payments.len() as i64,
            verified_transactions: tables
                .payments
                .iter()
                .filter(|p| p.payment.status == "verified")
                .count() as i64,
            total_bills: tables.bills.len() as i64,
            total_pickups: tables.pickups.len() as i64,
        })
    }

    async fn dashboard_stats(&self, day: NaiveDate) -> Result<DashboardStats, StoreError> {
        let tables = self.check()?;
        let (start, end) = day_bounds(day);
        let within = |ts: &DateTime<Utc>| *ts >= start && *ts < end;
        Ok(DashboardStats {
            today_revenue: tables
                .bills
                .iter()
                .filter(|b| within(&b.created_at))
                .map(|b| b.totals.total)
                .sum::<Decimal>(),
            today_transactions: tables.payments.iter().filter(|p| within(&p.created_at)).count() as i64,
            low_stock_items: tables
                .inventory
                .iter()
                .filter(|i| i.stock > 0 && i.stock < 5)
                .count() as i64,
            out_of_stock_items: tables.inventory.iter().filter(|i| i.stock == 0).count() as i64,
        })
    }
}
