use std::time::Duration;

pub(crate) mod connection;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod pool;
pub(crate) mod pool_config;
pub(crate) mod postgres;
pub(crate) mod store;

/// How long a request waits for a pooled connection
pub(crate) const DB_TIMEOUT: Duration = Duration::from_secs(5);
