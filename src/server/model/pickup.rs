use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub(crate) const STATUS_SCHEDULED: &str = "scheduled";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchedulePickupRequest {
    pub waste_type: Option<String>,
    /// kilograms
    pub quantity: Option<Decimal>,
    /// `YYYY-MM-DD`
    pub pickup_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewPickup {
    pub waste_type: String,
    pub quantity: Decimal,
    pub pickup_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WastePickup {
    pub id: i64,
    pub waste_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub pickup_date: NaiveDate,
    pub status: String,
    pub scheduled_at: String,
}
