use crate::server::database::pool::Pool;
use std::ops::{Deref, DerefMut};
use tokio_postgres::Client;

/// A client checked out of a [`Pool`], handed back when dropped
pub(crate) struct Connection {
    client: Option<Client>,
    pool: Pool,
}

impl Connection {
    pub fn new(client: Client, pool: Pool) -> Self {
        Self {
            client: Some(client),
            pool,
        }
    }
}

impl Deref for Connection {
    type Target = Client;

    fn deref(&self) -> &Client {
        // only taken in drop
        self.client.as_ref().expect("connection used after release")
    }
}

impl DerefMut for Connection {
    fn deref_mut(&mut self) -> &mut Client {
        self.client.as_mut().expect("connection used after release")
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
