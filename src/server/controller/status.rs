use actix_web::{get, Responder, web};
use serde::Serialize;

use crate::server::util::time::{format_timestamp, helper};

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
    timestamp: String,
    version: &'static str,
}

fn status() -> StatusResponse {
    StatusResponse {
        status: "operational",
        message: "MSME Business Hub API is running",
        timestamp: format_timestamp(&helper::get_utc_now()),
        version: env!("CARGO_PKG_VERSION"),
    }
}

#[get("/")]
async fn index() -> impl Responder {
    web::Json(status())
}

#[get("/api/status")]
async fn api_status() -> impl Responder {
    web::Json(status())
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::server::controller::configure;
    use crate::server::state::test_support;

    #[actix_web::test]
    async fn both_routes_report_operational() {
        let app = test::init_service(App::new().app_data(test_support::state()).configure(configure)).await;
        for uri in ["/", "/api/status"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["status"], json!("operational"));
            assert_eq!(body["timestamp"], json!("1970-01-01T00:00:00"));
        }
    }
}
