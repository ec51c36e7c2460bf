#[cfg(test)]
pub(crate) mod colliding_store;
pub mod connection;
pub mod memory_store;
pub mod sql_store;
pub mod store;

pub use connection::{DbPool, create_pool, run_migrations};
pub use memory_store::MemoryStore;
pub use sql_store::SqlStore;
pub use store::Store;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::error::AppResult;
use std::sync::Arc;

/// Opens the backend selected by configuration; the SQL backend is migrated
/// before it is handed out.
pub async fn open_store(config: &DatabaseConfig) -> AppResult<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Sql => {
            let pool = create_pool(config).await?;
            run_migrations(&pool).await?;
            log::info!("Using SQL store");
            Ok(Arc::new(SqlStore::new(pool)))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
