pub mod json;
pub mod models;
pub mod schema;
pub mod seed;

mod activities;
mod alerts;
mod customers;
mod devices;
mod iot;
mod leaks;
mod maintenance;
mod payments;
mod pricing;
mod properties;
mod rbac;
mod tickets;
mod tips;
mod tokens;
mod usage;
mod users;
mod vouchers;
mod work_orders;

pub use customers::CustomerFilter;
pub use devices::{DeviceFilter, DeviceStats};
pub use leaks::LeakEventFilter;
pub use maintenance::MaintenanceFilter;
pub use payments::PaymentFilter;
pub use properties::PropertyFilter;
pub use tickets::TicketFilter;
pub use tips::{EngagementOutcome, TipFilter};
pub use usage::{UsageFilter, UsageSummary};
pub use work_orders::WorkOrderFilter;
pub use alerts::AlertFilter;

use crate::shared::{
    config::DatabaseConfig,
    errors::{AppError, ErrorType},
};
use diesel::{
    connection::{AnsiTransactionManager, SimpleConnection, TransactionManager},
    r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection},
    sqlite::SqliteConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde::Serialize;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type PooledSqlite = PooledConnection<ConnectionManager<SqliteConnection>>;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub struct DBAccessManager {
    connection: PooledSqlite,
}

impl DBAccessManager {
    pub fn new(connection: PooledSqlite) -> DBAccessManager {
        DBAccessManager { connection }
    }

    /// Runs `f` inside one transaction, rolled back when it returns an error.
    pub fn atomically<T, F>(&mut self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut DBAccessManager) -> Result<T, AppError>,
    {
        AnsiTransactionManager::begin_transaction(&mut *self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While opening transaction:"))?;
        match f(self) {
            Ok(value) => {
                AnsiTransactionManager::commit_transaction(&mut *self.connection)
                    .map_err(|err| AppError::from_diesel_err(err, "While committing:"))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) =
                    AnsiTransactionManager::rollback_transaction(&mut *self.connection)
                {
                    log::error!("Rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }
}

#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn db_pool(config: &DatabaseConfig) -> Result<DbPool, AppError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.url);
    Pool::builder()
        .max_size(config.max_connections)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout_ms: 5000,
        }))
        .build(manager)
        .map_err(|err| {
            AppError::new(
                &format!("SQLite connection pool could not be created: {}", err),
                ErrorType::Internal,
            )
        })
}

pub fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    let mut conn = pool.get().map_err(|err| {
        AppError::new(
            &format!("Error getting connection from pool: {}", err),
            ErrorType::Internal,
        )
    })?;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|err| {
        AppError::new(
            &format!("Error running migrations: {}", err),
            ErrorType::Internal,
        )
    })?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

pub fn get_db_access_manager(pool: DbPool) -> Result<DBAccessManager, AppError> {
    match pool.get() {
        Ok(conn) => Ok(DBAccessManager::new(conn)),
        Err(err) => Err(AppError::new(
            &format!("Error getting connection from pool: {}", err),
            ErrorType::Internal,
        )),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: i64 = 15;
    pub const MAX_PER_PAGE: i64 = 100;

    pub fn new(page: Option<i64>, per_page: Option<i64>) -> PageRequest {
        PageRequest {
            page: page.unwrap_or(1).clamp(1, i64::MAX / Self::MAX_PER_PAGE),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Page<T> {
        let last_page = ((total + request.per_page - 1) / request.per_page).max(1);
        Page {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }
}

pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_inputs() {
        let req = PageRequest::new(Some(0), Some(500));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 100);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), None);
        assert_eq!(req.per_page, 15);
        assert_eq!(req.offset(), 30);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let req = PageRequest::new(Some(i64::MAX), Some(100));
        assert_eq!(req.page, i64::MAX / PageRequest::MAX_PER_PAGE);
        assert!(req.offset() > 0);

        let req = PageRequest::new(Some(i64::MIN), None);
        assert_eq!(req.page, 1);
    }

    #[test]
    fn last_page_rounds_up() {
        let page = Page::new(vec![1, 2], 31, PageRequest::new(Some(1), Some(15)));
        assert_eq!(page.last_page, 3);
        let empty: Page<i32> = Page::new(vec![], 0, PageRequest::new(None, None));
        assert_eq!(empty.last_page, 1);
    }
}
