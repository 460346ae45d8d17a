#[derive(Debug, Clone)]
pub(crate) struct PoolConfig {
    /// connection pool size
    pub size: usize,
    /// connection string
    pub conn_str: String,
}

impl PoolConfig {
    pub fn new(conn_str: impl Into<String>, size: usize) -> Self {
        Self {
            size,
            conn_str: conn_str.into(),
        }
    }
}
