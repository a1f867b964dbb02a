//! persistence: connection pooling and the storage seam used by the handlers

pub(crate) mod connection;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod pool;
pub(crate) mod postgres;
pub(crate) mod store;

use crate::server::model::config::DbConfig;

#[cfg(not(test))]
pub(crate) type AppStore = postgres::PgStore;
#[cfg(test)]
pub(crate) type AppStore = memory::MemoryStore;

#[cfg(not(test))]
pub(crate) async fn open(config: &DbConfig) -> AppStore {
    postgres::PgStore::connect(config).await
}

#[cfg(test)]
pub(crate) async fn open(_: &DbConfig) -> AppStore {
    memory::MemoryStore::default()
}
