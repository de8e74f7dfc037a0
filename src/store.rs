//! Asynchronous key-value store for app-scoped preferences.
//!
//! Consumers only see [`SettingsStore`]; the production implementation keeps
//! values in the SQLite `local_settings` table and runs each statement on the
//! tokio blocking pool so callers on the UI task never wait on disk I/O.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{self, DbState};

/// Settings category used for every preference written through this store.
const CATEGORY: &str = "general";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings storage failed: {0}")]
    Backend(String),
    #[error("settings task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Local, app-scoped, asynchronous key-value store.
pub trait SettingsStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// [`SettingsStore`] backed by the local SQLite database.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    db: Arc<DbState>,
}

impl SqliteSettingsStore {
    pub fn new(db: Arc<DbState>) -> Self {
        Self { db }
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        let db = self.db.clone();
        let key = key.to_string();
        async move {
            tokio::task::spawn_blocking(move || {
                let conn = db.conn.lock().map_err(|e| StoreError::Backend(e.to_string()))?;
                db::get_setting(&conn, CATEGORY, &key).map_err(StoreError::Backend)
            })
            .await?
        }
    }

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        let db = self.db.clone();
        let key = key.to_string();
        let value = value.to_string();
        async move {
            tokio::task::spawn_blocking(move || {
                let conn = db.conn.lock().map_err(|e| StoreError::Backend(e.to_string()))?;
                db::set_setting(&conn, CATEGORY, &key, &value).map_err(StoreError::Backend)
            })
            .await?
        }
    }
}
