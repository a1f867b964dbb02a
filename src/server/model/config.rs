use std::net::SocketAddrV4;
use std::time::Duration;

/// Server configs
#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub addr: SocketAddrV4,
    pub db: DbConfig,
    pub session: SessionConfig,
}

impl ServerConfig {
    pub fn new(addr: SocketAddrV4, db: DbConfig, session: SessionConfig) -> Self {
        Self { addr, db, session }
    }
}

/// Connection parameters of the relational store plus pool sizing.
#[derive(Clone)]
pub(crate) struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub read_pool_size: usize,
    pub write_pool_size: usize,
    /// bound on acquiring a connection and on each database round trip
    pub timeout: Duration,
}

impl DbConfig {
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.name)
            .connect_timeout(self.timeout);
        config
    }
}

// keep the password out of logs
impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("read_pool_size", &self.read_pool_size)
            .field("write_pool_size", &self.write_pool_size)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Signing material for session tokens. `previous` is still accepted for verification while a rotation is rolled out.
#[derive(Clone)]
pub(crate) struct SessionConfig {
    pub secret: String,
    pub previous_secret: Option<String>,
    pub ttl: chrono::Duration,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("rotating", &self.previous_secret.is_some())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
