use anyhow::{Context, Result as AnyhowResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Clone)]
pub struct DatabaseManager {
    db_path: PathBuf,
    pool: Pool<Sqlite>,
}

impl DatabaseManager {
    pub async fn new(db_path: impl AsRef<Path>) -> AnyhowResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database at: {}", db_path.display()))?;

        let manager = Self { db_path, pool };

        manager.optimize_for_performance().await?;
        manager.run_migrations().await?;

        info!("Database initialized at: {}", manager.db_path.display());
        Ok(manager)
    }

    /// Open a private in-memory database, mostly for tests
    pub async fn open_in_memory() -> AnyhowResult<Self> {
        // Every pooled connection would otherwise get its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to create in-memory database")?;

        let manager = Self {
            db_path: PathBuf::from(":memory:"),
            pool,
        };

        manager.run_migrations().await?;

        debug!("In-memory database initialized");
        Ok(manager)
    }

    async fn optimize_for_performance(&self) -> AnyhowResult<()> {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await
            .context("Failed to set WAL mode")?;

        sqlx::query("PRAGMA temp_store = MEMORY")
            .execute(&self.pool)
            .await
            .context("Failed to set temp store")?;

        // NORMAL is safe with WAL
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&self.pool)
            .await
            .context("Failed to set synchronous mode")?;

        debug!("Database optimized for performance");
        Ok(())
    }

    async fn run_migrations(&self) -> AnyhowResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        debug!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn close(self) -> AnyhowResult<()> {
        self.pool.close().await;
        Ok(())
    }

    pub async fn health_check(&self) -> AnyhowResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
