//! Shared application state
//!
//! Everything a request handler needs, cloned cheaply into the router. The
//! task registry and user directories are injected here explicitly rather
//! than living in process-wide globals.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatcher::DispatcherHandle;
use crate::registry::TaskRegistry;
use crate::userdirs::UserDirs;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub registry: Arc<TaskRegistry>,
    pub dispatcher: DispatcherHandle,
    pub dirs: Arc<UserDirs>,
}
