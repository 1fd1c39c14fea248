//! Transactional scope over one pooled database connection.
//!
//! A [`DatabaseContext`] is opened per unit of work and handed down the call
//! chain by `&mut` reference. It is never stored or shared, so one context
//! belongs to exactly one request and nesting is impossible by construction.

use tracing::{debug, error, warn};

use crate::error::ImageError;
use crate::ports::record_store::{RecordConnection, RecordStore};

/// Scope for a single unit of work.
///
/// Call [`DatabaseContext::exit`] with the outcome of the work to finish the
/// scope: an unfinished transaction is rolled back and the connection goes
/// back to the pool. Dropping the context without `exit` still releases the
/// connection, and the store discards any uncommitted writes.
pub struct DatabaseContext {
    connection: Option<Box<dyn RecordConnection>>,
    in_transaction: bool,
}

impl DatabaseContext {
    /// Check out a connection from `store` and open the scope.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Connection`] if the pool cannot supply a
    /// connection.
    pub async fn enter(store: &dyn RecordStore) -> Result<Self, ImageError> {
        let connection = store.connect().await?;
        debug!("database context entered");
        Ok(Self { connection: Some(connection), in_transaction: false })
    }

    /// Start the scope's transaction.
    ///
    /// # Errors
    ///
    /// Fails if a transaction is already open or the database refuses.
    pub async fn begin_transaction(&mut self) -> Result<(), ImageError> {
        if self.in_transaction {
            return Err(ImageError::Internal("transaction already open".to_string()));
        }
        self.connection()?.begin_transaction().await?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// # Errors
    ///
    /// Fails if no transaction is open or the commit is refused.
    pub async fn commit_transaction(&mut self) -> Result<(), ImageError> {
        self.records()?.commit_transaction().await?;
        self.in_transaction = false;
        Ok(())
    }

    /// Roll back the open transaction.
    ///
    /// # Errors
    ///
    /// Fails if no transaction is open or the rollback is refused.
    pub async fn rollback_transaction(&mut self) -> Result<(), ImageError> {
        self.records()?.rollback_transaction().await?;
        self.in_transaction = false;
        Ok(())
    }

    /// Whether a transaction is currently open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Record operations on this scope's connection.
    ///
    /// # Errors
    ///
    /// Fails unless a transaction is open; records are only touched inside one.
    pub fn records(&mut self) -> Result<&mut (dyn RecordConnection + 'static), ImageError> {
        if !self.in_transaction {
            return Err(ImageError::Internal("no open transaction".to_string()));
        }
        self.connection()
    }

    fn connection(&mut self) -> Result<&mut (dyn RecordConnection + 'static), ImageError> {
        self.connection
            .as_deref_mut()
            .ok_or_else(|| ImageError::Internal("database context already closed".to_string()))
    }

    /// Close the scope, passing `outcome` through.
    ///
    /// A transaction still open here is rolled back, whether `outcome` is an
    /// error or the work returned early without committing. A failed rollback
    /// is logged; it never replaces `outcome`.
    ///
    /// # Errors
    ///
    /// Returns `outcome`'s error unchanged.
    pub async fn exit<T>(mut self, outcome: Result<T, ImageError>) -> Result<T, ImageError> {
        if self.in_transaction {
            if let Err(e) = &outcome {
                warn!(error = %e, "rolling back after failure");
            }
            if let Err(e) = self.rollback_transaction().await {
                error!(error = %e, "rollback failed");
            }
        }
        self.connection = None;
        debug!("database context exited");
        outcome
    }
}

impl Drop for DatabaseContext {
    fn drop(&mut self) {
        if self.connection.is_some() {
            warn!(in_transaction = self.in_transaction, "database context dropped without exit");
        }
    }
}
