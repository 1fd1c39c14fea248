//! Record store port: pooled persistence of image records.
//!
//! A [`RecordStore`] owns the connection pool. Each unit of work checks out
//! one [`RecordConnection`] and runs every query through it; no operation
//! opens a connection of its own. Dropping a connection hands it back to the
//! pool.

use std::future::Future;
use std::pin::Pin;

use crate::error::ImageError;
use crate::model::ImageDetail;

/// Boxed future type returned by record store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ImageError>> + Send + 'a>>;

/// Hands out pooled connections to the image table.
pub trait RecordStore: Send + Sync {
    /// Check out a connection for one unit of work.
    ///
    /// Fails with [`ImageError::Connection`] when the pool cannot supply one.
    fn connect(&self) -> StoreFuture<'_, Box<dyn RecordConnection>>;
}

/// One checked-out connection with transaction control and record operations.
pub trait RecordConnection: Send {
    /// Start an explicit transaction.
    fn begin_transaction(&mut self) -> StoreFuture<'_, ()>;

    /// Commit the open transaction.
    fn commit_transaction(&mut self) -> StoreFuture<'_, ()>;

    /// Roll back the open transaction.
    fn rollback_transaction(&mut self) -> StoreFuture<'_, ()>;

    /// Insert a record. Does not commit; returns the record as given.
    fn create(&mut self, record: ImageDetail) -> StoreFuture<'_, ImageDetail>;

    /// Fetch one record, or [`ImageError::NotFound`].
    fn get_by_guid(&mut self, guid: &str) -> StoreFuture<'_, ImageDetail>;

    /// Fetch every record in insertion order.
    fn get_all(&mut self) -> StoreFuture<'_, Vec<ImageDetail>>;

    /// Read the image file behind a record.
    ///
    /// Fails with [`ImageError::NotFound`] when no record matches and
    /// [`ImageError::ImageNotFound`] when the record's file is missing.
    fn get_content(&mut self, guid: &str) -> StoreFuture<'_, Vec<u8>>;
}
