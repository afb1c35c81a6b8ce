mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::crypto::IssuerKeys;
use crate::service::LicenseService;

pub type DbPool = Pool<SqliteConnectionManager>;

/// How long a writer waits for another writer's transaction before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LicenseService>,
    /// Base URL used to build activation links (e.g., https://maps.example.com)
    pub base_url: String,
    /// Returned to devices on successful activation, if set
    pub content_url: Option<String>,
    /// Keys allowed to mint licenses over HTTP
    pub issuer_keys: IssuerKeys,
}

impl AppState {
    pub fn activation_url(&self, license_id: &str) -> String {
        format!("{}/activate/{}", self.base_url.trim_end_matches('/'), license_id)
    }
}

fn manager(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)
    })
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = manager(SqliteConnectionManager::file(database_path));
    Pool::builder().max_size(10).build(manager)
}
