use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable: the pool is an `Arc` internally
/// and the config sits behind one.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: estato_db::DbPool,
    /// Server configuration (JWT secrets, timeouts).
    pub config: Arc<ServerConfig>,
}
