use crate::server::database::connection::Connection;
use crate::server::database::pool_config::PoolConfig;
use anyhow::{bail, Context, Error};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tokio_postgres::{Client, NoTls};

pub(crate) struct CommonPool {
    /// pool name, only used in logs
    pub name: String,
    /// idle connections, accessed in a FIFO manner
    pub connections: Mutex<VecDeque<Client>>,
    /// one permit per idle connection
    pub available: Semaphore,
    /// set by [`Pool::init`], used to replace connections that closed
    pub conn_str: OnceLock<String>,
    /// slots waiting for a replacement connection
    pub reconnecting: AtomicUsize,
}

/// first and longest pause between attempts to replace a closed connection
const RECONNECT_BACKOFF: (Duration, Duration) = (Duration::from_millis(500), Duration::from_secs(30));

/// A fixed set of postgres connections shared by all workers
pub(crate) struct Pool(Arc<CommonPool>);

impl Clone for Pool {
    fn clone(&self) -> Pool {
        Pool(self.0.clone())
    }
}

pub(crate) mod connect_util {
    use super::*;

    pub async fn connect(conn_str: &str) -> Result<Client, Error> {
        let (client, conn) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .context("failed to create connection")?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }
}

impl Pool {
    /// create an empty pool, see [`Pool::init`]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(CommonPool {
            name: name.into(),
            connections: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
            conn_str: OnceLock::new(),
            reconnecting: AtomicUsize::new(0),
        }))
    }

    /// open `config.size` connections concurrently and add them to the pool
    pub async fn init(&self, config: &PoolConfig) -> Result<(), Error> {
        if self.0.conn_str.set(config.conn_str.clone()).is_err() {
            bail!("pool {} is already initialized", self.0.name);
        }
        let mut set = JoinSet::new();
        for _ in 0..config.size {
            let conn_str = config.conn_str.clone();
            set.spawn(async move { connect_util::connect(conn_str.as_str()).await });
        }
        let mut opened = 0;
        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(client)) => {
                    self.push(client);
                    opened += 1;
                }
                Ok(Err(e)) => error!("pool {} failed to connect, {:#}", self.0.name, e),
                Err(e) => error!("join_next failed when joining, {}", e),
            }
        }
        if opened == 0 && config.size > 0 {
            bail!("pool {} could not open any connection", self.0.name);
        }
        info!("pool {} initialized with {} connections", self.0.name, opened);
        Ok(())
    }

    /// acquire a connection, bail out with `None` if `timeout` elapses first.
    pub async fn acquire(&self, timeout: Duration) -> Option<Connection> {
        let sleep = time::sleep(timeout);
        tokio::pin!(sleep);
        tokio::select! {
            permit = self.0.available.acquire() => {
                let permit = permit.ok()?;
                // the permit travels with the connection and is restored on release
                permit.forget();
                let client = self.0.connections.lock().ok()?.pop_front()?;
                Some(Connection::new(client, self.clone()))
            },
            _ = &mut sleep => {
                error!("timed out to acquire a connection from pool {} after {:?}", self.0.name, timeout);
                None
            },
        }
    }

    pub fn release(&self, client: Client) {
        if client.is_closed() {
            error!("dropping closed connection from pool {}", self.0.name);
            self.reconnect_slot();
            return;
        }
        self.push(client);
    }

    /// Open a replacement connection in the background, retrying until the database is back.
    ///
    /// The slot stays unavailable to [`Pool::acquire`] until the new connection is pushed.
    fn reconnect_slot(&self) {
        let Some(conn_str) = self.0.conn_str.get().cloned() else {
            error!("pool {} was never initialized, cannot reconnect", self.0.name);
            return;
        };
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("pool {} cannot reconnect outside a runtime, {}", self.0.name, e);
                return;
            }
        };
        self.0.reconnecting.fetch_add(1, Ordering::SeqCst);
        let pool = self.clone();
        handle.spawn(async move {
            let (mut backoff, max_backoff) = RECONNECT_BACKOFF;
            loop {
                match connect_util::connect(conn_str.as_str()).await {
                    Ok(client) => {
                        info!("pool {} replaced a closed connection", pool.0.name);
                        pool.0.reconnecting.fetch_sub(1, Ordering::SeqCst);
                        pool.push(client);
                        return;
                    }
                    Err(e) => {
                        warn!("pool {} reconnect failed, retrying in {:?}, {:#}", pool.0.name, backoff, e);
                        time::sleep(backoff).await;
                        backoff = (backoff * 2).min(max_backoff);
                    }
                }
            }
        });
    }

    #[cfg(test)]
    pub fn reconnecting(&self) -> usize {
        self.0.reconnecting.load(Ordering::SeqCst)
    }

    fn push(&self, client: Client) {
        match self.0.connections.lock() {
            Ok(mut connections) => {
                connections.push_back(client);
                self.0.available.add_permits(1);
            }
            Err(e) => error!("pool {} lock poisoned, {}", self.0.name, e),
        }
    }

    #[cfg(test)]
    pub fn idle(&self) -> usize {
        self.0.connections.lock().map(|c| c.len()).unwrap_or_default()
    }
}
