//! MySQL record store backed by a fixed-size `sqlx` pool.
//!
//! Queries use the runtime-checked `sqlx::query` form so no database is
//! needed at compile time. Transactions are driven with plain
//! `START TRANSACTION` / `COMMIT` / `ROLLBACK` statements on the checked-out
//! connection, which lets the caller decide when a unit of work begins.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Executor, MySql};
use tracing::{debug, error, warn};

use crate::config::DatabaseConfig;
use crate::error::ImageError;
use crate::model::ImageDetail;
use crate::ports::record_store::{RecordConnection, RecordStore, StoreFuture};

const CREATE_IMAGES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS images (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    guid VARCHAR(64) NOT NULL UNIQUE,
    filename VARCHAR(255) NOT NULL UNIQUE,
    prompt TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
)";

/// Record store over a MySQL connection pool.
#[derive(Debug, Clone)]
pub struct MySqlRecordStore {
    pool: MySqlPool,
    images_dir: PathBuf,
}

impl MySqlRecordStore {
    /// Open the pool and make sure the `images` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Connection`] if the database is unreachable, or
    /// [`ImageError::Database`] if the table cannot be created.
    pub async fn connect(config: &DatabaseConfig, images_dir: PathBuf) -> Result<Self, ImageError> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| ImageError::Connection(e.to_string()))?;

        sqlx::query(CREATE_IMAGES_TABLE).execute(&pool).await?;

        Ok(Self { pool, images_dir })
    }
}

impl RecordStore for MySqlRecordStore {
    fn connect(&self) -> StoreFuture<'_, Box<dyn RecordConnection>> {
        Box::pin(async move {
            let conn =
                self.pool.acquire().await.map_err(|e| ImageError::Connection(e.to_string()))?;
            debug!(idle = self.pool.num_idle(), "connection checked out");
            Ok(Box::new(MySqlRecordConnection {
                conn,
                images_dir: self.images_dir.clone(),
                in_transaction: false,
            }) as Box<dyn RecordConnection>)
        })
    }
}

/// A pooled MySQL connection serving one unit of work.
pub struct MySqlRecordConnection {
    conn: PoolConnection<MySql>,
    images_dir: PathBuf,
    in_transaction: bool,
}

impl MySqlRecordConnection {
    async fn run(&mut self, statement: &'static str) -> Result<(), ImageError> {
        (&mut *self.conn).execute(statement).await?;
        Ok(())
    }
}

impl RecordConnection for MySqlRecordConnection {
    fn begin_transaction(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.run("START TRANSACTION").await?;
            self.in_transaction = true;
            Ok(())
        })
    }

    fn commit_transaction(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.run("COMMIT").await?;
            self.in_transaction = false;
            Ok(())
        })
    }

    fn rollback_transaction(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.run("ROLLBACK").await?;
            self.in_transaction = false;
            Ok(())
        })
    }

    fn create(&mut self, record: ImageDetail) -> StoreFuture<'_, ImageDetail> {
        Box::pin(async move {
            sqlx::query("INSERT INTO images (guid, filename, prompt) VALUES (?, ?, ?)")
                .bind(&record.guid)
                .bind(&record.filename)
                .bind(&record.prompt)
                .execute(&mut *self.conn)
                .await
                .map_err(insert_error)?;
            Ok(record)
        })
    }

    fn get_by_guid(&mut self, guid: &str) -> StoreFuture<'_, ImageDetail> {
        let guid = guid.to_owned();
        Box::pin(async move {
            let row: Option<(String, String, String)> =
                sqlx::query_as("SELECT guid, filename, prompt FROM images WHERE guid = ?")
                    .bind(&guid)
                    .fetch_optional(&mut *self.conn)
                    .await?;
            row.map(|(guid, filename, prompt)| ImageDetail { prompt, guid, filename })
                .ok_or_else(|| ImageError::NotFound(format!("No image found with GUID {guid}")))
        })
    }

    fn get_all(&mut self) -> StoreFuture<'_, Vec<ImageDetail>> {
        Box::pin(async move {
            let rows: Vec<(String, String, String)> =
                sqlx::query_as("SELECT guid, filename, prompt FROM images ORDER BY id")
                    .fetch_all(&mut *self.conn)
                    .await?;
            Ok(rows
                .into_iter()
                .map(|(guid, filename, prompt)| ImageDetail { prompt, guid, filename })
                .collect())
        })
    }

    fn get_content(&mut self, guid: &str) -> StoreFuture<'_, Vec<u8>> {
        let guid = guid.to_owned();
        Box::pin(async move {
            let filename: Option<String> =
                sqlx::query_scalar("SELECT filename FROM images WHERE guid = ?")
                    .bind(&guid)
                    .fetch_optional(&mut *self.conn)
                    .await?;
            let filename = filename
                .ok_or_else(|| ImageError::NotFound(format!("No image found with GUID {guid}")))?;

            let path = self.images_dir.join(&filename);
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    error!(%guid, path = %path.display(), "record has no image file");
                    Err(ImageError::ImageNotFound(format!("No file found at {}", path.display())))
                }
                Err(e) => Err(ImageError::Storage(e)),
            }
        })
    }
}

impl Drop for MySqlRecordConnection {
    fn drop(&mut self) {
        // An open transaction must not travel back into the pool.
        if self.in_transaction {
            warn!("connection released mid-transaction; closing it instead of pooling");
            self.conn.close_on_drop();
        }
    }
}

/// Map insert failures, singling out unique-key violations.
fn insert_error(err: sqlx::Error) -> ImageError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return ImageError::ConstraintViolation(db.message().to_string());
        }
    }
    ImageError::Database(err)
}
