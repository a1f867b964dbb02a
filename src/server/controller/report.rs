use actix_web::{get, web, Responder};
use log::error;

use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::report::Summary;
use crate::server::state::AppState;
use crate::server::util::time::helper;

#[get("/api/reports/summary")]
async fn summary(data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    match data.store().summary_counts().await {
        Ok(counts) => Ok(web::Json(Summary::from(counts))),
        Err(e) => {
            error!("summary failed, {}", e);
            Err(e.into())
        }
    }
}

#[get("/api/dashboard/stats")]
/// Figures for the current UTC day
async fn dashboard_stats(data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let today = helper::get_utc_now().date_naive();
    match data.store().dashboard_stats(today).await {
        Ok(stats) => Ok(web::Json(stats)),
        Err(e) => {
            error!("dashboard_stats failed, {}", e);
            Err(e.into())
        }
    }
}
