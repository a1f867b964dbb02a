use crate::server::database::connection::Connection;
use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time;
use tokio_postgres::{Client, Config};

const RETRY_INTERVAL: Duration = Duration::from_millis(20);

pub(crate) struct CommonPool {
    /// pool name
    name: &'static str,
    config: Config,
    /// max number of open connections
    size: usize,
    /// idle + checked out connections
    open: AtomicUsize,
    /// idle connections in the pool, accessed in a FIFO manner
    connections: Mutex<VecDeque<Client>>,
}

pub(crate) struct Pool(Arc<CommonPool>);

impl Clone for Pool {
    fn clone(&self) -> Pool {
        Pool(self.0.clone())
    }
}

pub(crate) mod connect_util {
    use log::error;
    use tokio_postgres::{Client, Config, NoTls};

    pub async fn connect(config: &Config) -> Result<Client, tokio_postgres::Error> {
        let (client, conn) = config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }
}

/// Slot taken towards `size`; handed back unless a live client ends up occupying it.
struct Reservation<'a> {
    pool: &'a CommonPool,
    armed: bool,
}

impl Reservation<'_> {
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Pool {
    /// create an empty connection pool, connections are opened by `init` or lazily on `acquire`
    pub fn new(name: &'static str, config: Config, size: usize) -> Self {
        Self(Arc::new(CommonPool {
            name,
            config,
            size,
            open: AtomicUsize::new(0),
            connections: Mutex::new(VecDeque::with_capacity(size)),
        }))
    }

    /// Open all connections up front. Failures are logged, the pool retries lazily later.
    pub async fn init(&self) -> usize {
        let mut set = JoinSet::new();
        for _ in 0..self.0.size {
            let Some(reservation) = self.reserve() else {
                break;
            };
            reservation.keep();
            let config = self.0.config.clone();
            set.spawn(async move { connect_util::connect(&config).await });
        }
        let mut opened = VecDeque::with_capacity(self.0.size);
        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(client)) => opened.push_back(client),
                Ok(Err(e)) => {
                    self.0.open.fetch_sub(1, Ordering::SeqCst);
                    error!("pool={} failed to connect, {}", self.0.name, e);
                }
                Err(e) => {
                    self.0.open.fetch_sub(1, Ordering::SeqCst);
                    error!("join_next failed when joining, {}", e);
                }
            };
        }
        let count = opened.len();
        self.0.connections.lock().await.append(&mut opened);
        info!("pool={} initialized with {}/{} connections", self.0.name, count, self.0.size);
        count
    }

    fn reserve(&self) -> Option<Reservation<'_>> {
        let size = self.0.size;
        self.0
            .open
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < size).then_some(n + 1))
            .ok()
            .map(|_| Reservation {
                pool: &self.0,
                armed: true,
            })
    }

    /// acquire a connection within `timeout`, bail out with `None` if it exceeds or the database is unreachable.
    pub async fn acquire(&self, timeout: Duration) -> Option<Connection> {
        let wait = async {
            loop {
                let idle = self.0.connections.lock().await.pop_front();
                match idle {
                    Some(client) if !client.is_closed() => return Some(client),
                    Some(_) => {
                        warn!("pool={} discarding closed connection", self.0.name);
                        self.0.open.fetch_sub(1, Ordering::SeqCst);
                        continue;
                    }
                    None => {}
                }
                if let Some(reservation) = self.reserve() {
                    return match connect_util::connect(&self.0.config).await {
                        Ok(client) => {
                            reservation.keep();
                            Some(client)
                        }
                        Err(e) => {
                            error!("pool={} failed to connect, {}", self.0.name, e);
                            None
                        }
                    };
                }
                time::sleep(RETRY_INTERVAL).await;
            }
        };
        match time::timeout(timeout, wait).await {
            Ok(client) => client.map(|client| Connection::new(client, self.clone())),
            Err(_) => {
                error!(
                    "pool={} timed out to acquire a connection after {:?}",
                    self.0.name, timeout
                );
                None
            }
        }
    }

    pub fn release(&self, client: Client) {
        if client.is_closed() {
            self.0.open.fetch_sub(1, Ordering::SeqCst);
            return;
        }
        if let Ok(mut connections) = self.0.connections.try_lock() {
            connections.push_back(client);
            return;
        }
        // contended, hand back off the runtime thread
        let pool = self.0.clone();
        let handle = thread::spawn(move || {
            pool.connections.blocking_lock().push_back(client);
        });
        if handle.join().is_err() {
            error!("pool={} failed to release a connection", self.0.name);
        }
    }

    #[cfg(test)]
    pub fn open_connections(&self) -> usize {
        self.0.open.load(Ordering::SeqCst)
    }
}
