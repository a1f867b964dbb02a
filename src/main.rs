//! application entry point

use crate::server::model::config::{DbConfig, ServerConfig, SessionConfig};
use anyhow::{bail, Context};
use derive_more::Display;
use log::{info, warn};
use rand::distributions::{Alphanumeric, DistString};
use std::env;
use std::net::SocketAddrV4;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

mod server;

const DEFAULT_HOST_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

#[actix_web::main()]
async fn main() -> anyhow::Result<()> {
    // bootstrap
    // a. env
    let env = env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Env::Dev); // default dev env if absent

    let dotenv = match env {
        Env::Prod | Env::Stg => None, // provided by the deployment
        Env::Dev => Some(dotenvy::from_path(Path::new(".env.dev"))),
    };

    // b. logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    if let Some(Err(e)) = dotenv {
        warn!("could not load .env.dev, {}", e);
    }

    // c. run app
    let config = ServerConfig::new(
        SocketAddrV4::from_str(var_or("HOST", DEFAULT_HOST_ADDR).as_str()).context("failed to parse HOST")?,
        db_config()?,
        session_config(&env)?,
    );

    info!("App is starting in env={}", env);

    server::run(config).await?;
    Ok(())
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("failed to parse {key}")),
        Err(_) => Ok(default),
    }
}

fn db_config() -> anyhow::Result<DbConfig> {
    Ok(DbConfig {
        host: var_or("DB_HOST", "localhost"),
        port: parsed_or("DB_PORT", 5432)?,
        user: var_or("DB_USER", "postgres"),
        password: var_or("DB_PASSWORD", ""),
        name: var_or("DB_NAME", "msme_db"),
        read_pool_size: parsed_or("DB_READ_POOL_SIZE", DEFAULT_POOL_SIZE)?,
        write_pool_size: parsed_or("DB_WRITE_POOL_SIZE", DEFAULT_POOL_SIZE)?,
        timeout: Duration::from_secs(parsed_or("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECONDS)?),
    })
}

fn session_config(env: &Env) -> anyhow::Result<SessionConfig> {
    let secret = match (env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty()), env) {
        (Some(secret), _) => secret,
        (None, Env::Dev) => {
            warn!("SESSION_SECRET is not set, sessions will not survive a restart");
            Alphanumeric.sample_string(&mut rand::thread_rng(), 64)
        }
        (None, _) => bail!("SESSION_SECRET is required in env={}", env),
    };
    let ttl_minutes: i64 = parsed_or("SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
    Ok(SessionConfig {
        secret,
        previous_secret: env::var("SESSION_SECRET_PREVIOUS").ok().filter(|s| !s.is_empty()),
        ttl: chrono::Duration::minutes(ttl_minutes),
    })
}

#[derive(Debug, Display)]
#[non_exhaustive]
enum Env {
    #[display("dev")]
    Dev,
    #[display("stg")]
    Stg,
    #[display("prod")]
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "stg" => Ok(Self::Stg),
            "prod" => Ok(Self::Prod),
            s => Err(format!("Invalid Env: {s}")),
        }
    }
}
