//! HTTP handlers, one module per resource

pub(crate) mod bill;
pub(crate) mod bills;
pub(crate) mod error;
pub(crate) mod inventory;
pub(crate) mod payment;
pub(crate) mod pickup;
pub(crate) mod report;
pub(crate) mod session;
pub(crate) mod status;

use actix_web::web;
use log::debug;

use crate::server::controller::error::ApiError;

fn bad_request(what: &str, err: impl std::fmt::Display) -> actix_web::Error {
    debug!("rejected {}, {}", what, err);
    ApiError::Validation(format!("Invalid {what}: {err}")).into()
}

/// Register every route plus extractor error handlers that answer with the JSON failure body.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_request("request body", err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request("query string", err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request("path", err)))
        .service(status::index)
        .service(status::api_status)
        .service(session::login)
        .service(session::current_session)
        .service(bill::create_bill)
        .service(bill::get_bill)
        .service(bills::bill_history)
        .service(bills::export_bills)
        .service(payment::verify_payment)
        .service(payment::payment_history)
        .service(pickup::schedule_pickup)
        .service(pickup::pickup_history)
        .service(inventory::list_inventory)
        .service(inventory::list_products)
        .service(inventory::add_inventory)
        .service(report::summary)
        .service(report::dashboard_stats);
}
