use actix_web::{get, post, web, Responder};
use log::{info, warn};

use crate::server::billing::calculator::InvoiceTotals;
use crate::server::billing::validation::check_totals;
use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::bill::{CreateBillRequest, CreateBillResponse, GetBillResponse};
use crate::server::state::AppState;

#[post("/api/create_bill")]
/// Price a bill and record it with its items
async fn create_bill(
    body: web::Json<CreateBillRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let bill = body.into_inner().validate()?;
    let totals = InvoiceTotals::compute(&bill.items).rounded();
    check_totals(&totals)?;

    let recorded = data.store().create_bill(&bill, &totals).await.map_err(|e| {
        warn!("create_bill failed, {}", e);
        ApiError::from(e)
    })?;
    info!(
        "bill={} customer={} items={} subtotal={} gst={} total={}",
        recorded.id,
        recorded.customer_name,
        recorded.items.len(),
        totals.subtotal,
        totals.tax,
        totals.total
    );
    Ok(web::Json(CreateBillResponse {
        success: true,
        bill: recorded,
        message: "Bill created successfully".to_string(),
    }))
}

#[get("/api/bill/{id}")]
/// A recorded bill with its items
async fn get_bill(id: web::Path<i64>, data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let id = id.into_inner();
    match data.store().get_bill(id).await {
        Ok(Some(bill)) => Ok(web::Json(GetBillResponse { success: true, bill })),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => {
            warn!("get_bill id={} failed, {}", id, e);
            Err(e.into())
        }
    }
}
