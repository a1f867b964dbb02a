use tokio_postgres::Client;
use crate::server::database::pool::Pool;

/// A client checked out of a `Pool`, handed back when dropped.
pub(crate) struct Connection {
    client: Option<Client>,
    pool: Pool,
}

impl Connection {
    pub fn new(client: Client, pool: Pool) -> Self {
        Self { client: Some(client), pool }
    }

    pub fn client(&self) -> &Client {
        self.client.as_ref().expect("client is present until the connection is dropped")
    }

    pub fn client_mut(&mut self) -> &mut Client {
        self.client.as_mut().expect("client is present until the connection is dropped")
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
