use crate::config::AppConfig;
use crate::errors::ServiceError;
use futures::future::BoxFuture;
use metrics::{counter, gauge};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    IsolationLevel, TransactionError, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };

    establish_connection_with_config(&config).await
}

/// Establishes a connection pool with custom pool tuning
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());

    // An in-memory SQLite database exists per connection; a wider pool would
    // hand out fresh empty databases.
    let (max_connections, min_connections) = if config.url.starts_with("sqlite::memory:") {
        (1, 1)
    } else {
        (config.max_connections, config.min_connections)
    };

    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(true);

    gauge!("reliefstock_db.max_connections", max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        max_connections
    );

    let db_pool = Database::connect(opt).await?;

    info!("Database connection pool established successfully");

    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Applies all pending embedded migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    crate::migrator::Migrator::up(pool, None).await?;
    info!("Database migrations completed");
    Ok(())
}

/// Runs `op` inside one store transaction.
///
/// On Postgres/MySQL the transaction is opened at SERIALIZABLE isolation so
/// two concurrent validate-then-append races cannot both commit. SQLite
/// serializes writers on its own, and does not accept an isolation clause.
pub async fn atomic<F, T>(db: &DatabaseConnection, op: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send + 'static,
{
    counter!("reliefstock_db.transaction.started", 1);

    let result = match db.get_database_backend() {
        DbBackend::Sqlite => db.transaction(op).await,
        _ => {
            db.transaction_with_config(op, Some(IsolationLevel::Serializable), None)
                .await
        }
    };

    result.map_err(|e| match e {
        TransactionError::Connection(db_err) => {
            counter!("reliefstock_db.transaction.failed", 1);
            ServiceError::DatabaseError(db_err)
        }
        TransactionError::Transaction(service_err) => {
            counter!("reliefstock_db.transaction.failed", 1);
            service_err
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn establishes_in_memory_pool_and_migrates() {
        let pool = establish_connection("sqlite::memory:")
            .await
            .expect("connect");
        assert!(run_migrations(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn atomic_dispatches_on_backend_and_surfaces_inner_errors() {
        let pool = establish_connection("sqlite::memory:")
            .await
            .expect("connect");

        let value = atomic(&pool, |_txn| Box::pin(async { Ok(7) }))
            .await
            .expect("commit");
        assert_eq!(value, 7);

        let failed: Result<(), _> = atomic(&pool, |_txn| {
            Box::pin(async { Err(ServiceError::BadRequest("no".to_string())) })
        })
        .await;
        assert!(matches!(failed, Err(ServiceError::BadRequest(_))));
    }
}
