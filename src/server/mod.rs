//! main file for the server

mod billing;
mod controller;
mod database;
mod fraud;
pub mod model;
mod session;
mod state;
mod util;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use crate::server::controller::configure;
use crate::server::fraud::FraudCheck;
use crate::server::model::config::ServerConfig;
use crate::server::session::SessionKeys;
use crate::server::state::AppState;

/// Run the server
pub async fn run(ServerConfig { addr, db, session }: ServerConfig) -> std::io::Result<()> {
    info!("connecting to database {:?}", db);
    let store = database::open(&db).await;
    let data = web::Data::new(AppState::new(store, SessionKeys::new(&session), FraudCheck::default()));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(configure)
    })
    .bind(addr)?
    .run()
    .await
}
