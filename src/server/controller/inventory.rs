use actix_web::{get, post, web, Responder};
use log::{error, info};
use rust_decimal::Decimal;

use crate::server::billing::DEFAULT_GST_RATE;
use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::inventory::{AddInventoryRequest, NewInventoryItem};
use crate::server::model::AckResponse;
use crate::server::state::AppState;
use crate::server::util::column::{fits_numeric, fits_varchar, NUMERIC_10_2_MAX};

const MAX_PRODUCT_NAME_LEN: usize = 255;
const MAX_CATEGORY_LEN: usize = 100;

impl AddInventoryRequest {
    fn validate(self) -> Result<NewInventoryItem, ApiError> {
        let required = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let (Some(product_name), Some(category), Some(price), Some(stock)) =
            (required(self.product_name), required(self.category), self.price, self.stock)
        else {
            return Err(ApiError::Validation("All fields are required".to_string()));
        };
        if !fits_varchar(&product_name, MAX_PRODUCT_NAME_LEN) {
            return Err(ApiError::Validation(format!(
                "Product name must be at most {MAX_PRODUCT_NAME_LEN} characters"
            )));
        }
        if !fits_varchar(&category, MAX_CATEGORY_LEN) {
            return Err(ApiError::Validation(format!(
                "Category must be at most {MAX_CATEGORY_LEN} characters"
            )));
        }
        if price < Decimal::ZERO || stock < 0 {
            return Err(ApiError::Validation("Price and stock must not be negative".to_string()));
        }
        if !fits_numeric(price, 2, NUMERIC_10_2_MAX) {
            return Err(ApiError::Validation("Price is out of range".to_string()));
        }
        let gst_rate = self.gst.unwrap_or(DEFAULT_GST_RATE);
        if gst_rate < Decimal::ZERO || !fits_numeric(gst_rate, 2, Decimal::ONE_HUNDRED) {
            return Err(ApiError::Validation("GST rate must be between 0 and 100".to_string()));
        }
        Ok(NewInventoryItem {
            product_name,
            category,
            price,
            stock,
            description: required(self.description),
            gst_rate,
        })
    }
}

#[get("/api/inventory")]
async fn list_inventory(data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    match data.store().list_inventory().await {
        Ok(items) => Ok(web::Json(items)),
        Err(e) => {
            error!("list_inventory failed, {}", e);
            Err(e.into())
        }
    }
}

#[get("/api/products")]
/// Inventory that can go on a bill
async fn list_products(data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    match data.store().billable_products().await {
        Ok(products) => Ok(web::Json(products)),
        Err(e) => {
            error!("list_products failed, {}", e);
            Err(e.into())
        }
    }
}

#[post("/api/add_inventory")]
async fn add_inventory(
    body: web::Json<AddInventoryRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let item = body.into_inner().validate()?;
    let id = data.store().add_inventory(&item).await.map_err(|e| {
        error!("add_inventory failed for {}, {}", item.product_name, e);
        ApiError::from(e)
    })?;
    info!("inventory={} product={} stock={}", id, item.product_name, item.stock);
    Ok(web::Json(AckResponse::ok("Product added to inventory successfully")))
}
