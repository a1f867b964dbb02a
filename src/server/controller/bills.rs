use actix_web::{get, routes, web, Responder};
use log::{error, info};

use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::bill::ExportBillsResponse;
use crate::server::model::CommonRequestParams;
use crate::server::state::AppState;

#[get("/api/bill_history")]
/// Newest bills first, with their item counts
async fn bill_history(
    params: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let (offset, limit) = params.window();
    match data.store().bill_history(offset, limit).await {
        Ok(bills) => Ok(web::Json(bills)),
        Err(e) => {
            error!("bill_history failed, {}", e);
            Err(e.into())
        }
    }
}

#[routes]
#[get("/api/export_bills")]
#[get("/api/export_bills_excel")]
/// Every bill item joined with its bill
async fn export_bills(data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let rows = data.store().export_bills().await.map_err(|e| {
        error!("export_bills failed, {}", e);
        ApiError::from(e)
    })?;
    info!("exporting {} bill rows", rows.len());
    Ok(web::Json(ExportBillsResponse {
        success: true,
        message: format!("Found {} bills for export", rows.len()),
        data: rows,
    }))
}
