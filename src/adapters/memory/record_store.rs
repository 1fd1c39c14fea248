//! In-memory adapter for the `RecordStore` port.
//!
//! Connections are limited by a semaphore sized like a real pool. Writes made
//! inside a transaction stay private to the connection until commit, and are
//! discarded on rollback or when the connection is dropped.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::ImageError;
use crate::model::ImageDetail;
use crate::ports::record_store::{RecordConnection, RecordStore, StoreFuture};

/// Record store holding committed rows in memory.
pub struct MemoryRecordStore {
    rows: Arc<Mutex<Vec<ImageDetail>>>,
    permits: Arc<Semaphore>,
    failing: Arc<AtomicBool>,
    images_dir: PathBuf,
}

impl MemoryRecordStore {
    /// A store allowing `capacity` concurrent connections, reading image
    /// files from `images_dir`.
    #[must_use]
    pub fn new(capacity: usize, images_dir: PathBuf) -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            permits: Arc::new(Semaphore::new(capacity)),
            failing: Arc::new(AtomicBool::new(false)),
            images_dir,
        }
    }

    /// Committed rows in insertion order.
    pub fn records(&self) -> Vec<ImageDetail> {
        self.rows.lock().expect("rows lock poisoned").clone()
    }

    /// Add a committed row directly.
    pub fn seed(&self, record: ImageDetail) {
        self.rows.lock().expect("rows lock poisoned").push(record);
    }

    /// Connections not currently checked out.
    pub fn available_connections(&self) -> usize {
        self.permits.available_permits()
    }

    /// Make every subsequent query fail with a driver error.
    pub fn fail_queries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl RecordStore for MemoryRecordStore {
    fn connect(&self) -> StoreFuture<'_, Box<dyn RecordConnection>> {
        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|_| ImageError::Connection("connection pool exhausted".to_string()));
        Box::pin(async move {
            Ok(Box::new(MemoryRecordConnection {
                rows: Arc::clone(&self.rows),
                failing: Arc::clone(&self.failing),
                images_dir: self.images_dir.clone(),
                staged: Vec::new(),
                in_transaction: false,
                _permit: permit?,
            }) as Box<dyn RecordConnection>)
        })
    }
}

/// One checked-out in-memory connection.
pub struct MemoryRecordConnection {
    rows: Arc<Mutex<Vec<ImageDetail>>>,
    failing: Arc<AtomicBool>,
    images_dir: PathBuf,
    staged: Vec<ImageDetail>,
    in_transaction: bool,
    _permit: OwnedSemaphorePermit,
}

impl MemoryRecordConnection {
    fn check(&self) -> Result<(), ImageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ImageError::Database(sqlx::Error::Protocol("simulated failure".into())));
        }
        Ok(())
    }

    /// Committed rows followed by this connection's uncommitted ones.
    fn visible(&self) -> Vec<ImageDetail> {
        let mut rows = self.rows.lock().expect("rows lock poisoned").clone();
        rows.extend(self.staged.iter().cloned());
        rows
    }

    fn find(&self, guid: &str) -> Result<ImageDetail, ImageError> {
        self.visible()
            .into_iter()
            .find(|r| r.guid == guid)
            .ok_or_else(|| ImageError::NotFound(format!("No image found with GUID {guid}")))
    }
}

impl RecordConnection for MemoryRecordConnection {
    fn begin_transaction(&mut self) -> StoreFuture<'_, ()> {
        let result = if self.in_transaction {
            Err(ImageError::Internal("transaction already open".to_string()))
        } else {
            self.in_transaction = true;
            Ok(())
        };
        Box::pin(async move { result })
    }

    fn commit_transaction(&mut self) -> StoreFuture<'_, ()> {
        let staged = std::mem::take(&mut self.staged);
        self.rows.lock().expect("rows lock poisoned").extend(staged);
        self.in_transaction = false;
        Box::pin(async { Ok(()) })
    }

    fn rollback_transaction(&mut self) -> StoreFuture<'_, ()> {
        self.staged.clear();
        self.in_transaction = false;
        Box::pin(async { Ok(()) })
    }

    fn create(&mut self, record: ImageDetail) -> StoreFuture<'_, ImageDetail> {
        let result = self.check().and_then(|()| {
            let clash = self
                .visible()
                .iter()
                .any(|r| r.guid == record.guid || r.filename == record.filename);
            if clash {
                return Err(ImageError::ConstraintViolation(format!(
                    "Duplicate entry for guid {} or filename {}",
                    record.guid, record.filename
                )));
            }
            if self.in_transaction {
                self.staged.push(record.clone());
            } else {
                self.rows.lock().expect("rows lock poisoned").push(record.clone());
            }
            Ok(record)
        });
        Box::pin(async move { result })
    }

    fn get_by_guid(&mut self, guid: &str) -> StoreFuture<'_, ImageDetail> {
        let result = self.check().and_then(|()| self.find(guid));
        Box::pin(async move { result })
    }

    fn get_all(&mut self) -> StoreFuture<'_, Vec<ImageDetail>> {
        let result = self.check().map(|()| self.visible());
        Box::pin(async move { result })
    }

    fn get_content(&mut self, guid: &str) -> StoreFuture<'_, Vec<u8>> {
        let found = self.check().and_then(|()| self.find(guid));
        let images_dir = self.images_dir.clone();
        Box::pin(async move {
            let path = images_dir.join(found?.filename);
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(ImageError::ImageNotFound(format!("No file found at {}", path.display())))
                }
                Err(e) => Err(ImageError::Storage(e)),
            }
        })
    }
}
