use actix_web::{get, post, web, Responder};
use log::{error, info};
use rust_decimal::Decimal;

use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::pickup::{NewPickup, SchedulePickupRequest};
use crate::server::model::{AckResponse, CommonRequestParams};
use crate::server::state::AppState;
use crate::server::util::column::{fits_numeric, fits_varchar, NUMERIC_10_2_MAX};

const MAX_WASTE_TYPE_LEN: usize = 50;

impl SchedulePickupRequest {
    fn validate(self) -> Result<NewPickup, ApiError> {
        let waste_type = self.waste_type.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let (Some(waste_type), Some(quantity), Some(pickup_date)) = (waste_type, self.quantity, self.pickup_date)
        else {
            return Err(ApiError::Validation("Waste type, quantity and pickup date are required".to_string()));
        };
        if !fits_varchar(&waste_type, MAX_WASTE_TYPE_LEN) {
            return Err(ApiError::Validation(format!(
                "Waste type must be at most {MAX_WASTE_TYPE_LEN} characters"
            )));
        }
        if quantity <= Decimal::ZERO {
            return Err(ApiError::Validation("Quantity must be positive".to_string()));
        }
        if !fits_numeric(quantity, 2, NUMERIC_10_2_MAX) {
            return Err(ApiError::Validation("Quantity is out of range".to_string()));
        }
        Ok(NewPickup {
            waste_type,
            quantity,
            pickup_date,
        })
    }
}

#[post("/api/schedule_pickup")]
async fn schedule_pickup(
    body: web::Json<SchedulePickupRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let pickup = body.into_inner().validate()?;
    let id = data.store().schedule_pickup(&pickup).await.map_err(|e| {
        error!("schedule_pickup failed, {}", e);
        ApiError::from(e)
    })?;
    info!("pickup={} type={} date={}", id, pickup.waste_type, pickup.pickup_date);
    Ok(web::Json(AckResponse::ok("Pickup scheduled successfully")))
}

#[get("/api/pickup_history")]
async fn pickup_history(
    params: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let (offset, limit) = params.window();
    match data.store().pickup_history(offset, limit).await {
        Ok(pickups) => Ok(web::Json(pickups)),
        Err(e) => {
            error!("pickup_history failed, {}", e);
            Err(e.into())
        }
    }
}
