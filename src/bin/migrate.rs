//! Bootstrap the schema and sample data.

use anyhow::{Context, Error};
use log::{error, info};
use std::env;
use tokio_postgres::NoTls;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("src/server/database/migrations");
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let dotenv = dotenvy::from_path(".env.dev");
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    if dotenv.is_err() {
        info!("no .env.dev found, using the process environment");
    }

    let port: u16 = var_or("DB_PORT", "5432").parse().context("DB_PORT is not a port number")?;
    let mut config = tokio_postgres::Config::new();
    config
        .host(&var_or("DB_HOST", "localhost"))
        .port(port)
        .user(&var_or("DB_USER", "postgres"))
        .password(&var_or("DB_PASSWORD", ""))
        .dbname(&var_or("DB_NAME", "msme_db"));

    let (mut client, conn) = config.connect(NoTls).await.context("failed to connect to db, aborting")?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            error!("connection error: {}", e);
        }
    });
    let report = embedded::migrations::runner().run_async(&mut client).await?;
    for migration in report.applied_migrations() {
        info!("applied {}", migration);
    }
    Ok(())
}
