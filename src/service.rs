//! Image service: the four request flows over a transactional scope.
//!
//! Every flow, reads included, opens a [`DatabaseContext`], works inside an
//! explicit transaction and closes the scope through
//! [`DatabaseContext::exit`], which rolls back anything left uncommitted and
//! returns the connection to the pool.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ImageError;
use crate::generation::ImageGeneration;
use crate::model::{ImageDetail, ImageDetailCreate};
use crate::ports::RecordStore;
use crate::transaction::DatabaseContext;

const INVALID_GUID: &str = "Invalid GUID provided.";
const LIST_FAILED: &str = "Unable to retrieve all image details.";

/// Orchestrates image creation and lookup.
pub struct ImageService {
    store: Arc<dyn RecordStore>,
    generation: ImageGeneration,
}

impl ImageService {
    /// Create a service over the given store and generation client.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, generation: ImageGeneration) -> Self {
        Self { store, generation }
    }

    /// Generate, store and record a new image.
    ///
    /// # Errors
    ///
    /// [`ImageError::DataValidation`] for a malformed request; otherwise the
    /// connection, generation, storage or store error that stopped the flow.
    pub async fn create_image(&self, request: &ImageDetailCreate) -> Result<ImageDetail, ImageError> {
        request.validate().map_err(ImageError::DataValidation)?;

        let mut ctx = DatabaseContext::enter(self.store.as_ref()).await?;
        let outcome = self.generate_and_commit(&mut ctx, request).await;
        let detail = ctx.exit(outcome).await?;
        info!(guid = %detail.guid, filename = %detail.filename, "image created");
        Ok(detail)
    }

    async fn generate_and_commit(
        &self,
        ctx: &mut DatabaseContext,
        request: &ImageDetailCreate,
    ) -> Result<ImageDetail, ImageError> {
        ctx.begin_transaction().await?;
        let detail = self.generation.generate(ctx, request).await?;
        ctx.commit_transaction().await?;
        Ok(detail)
    }

    /// Look up one record.
    ///
    /// # Errors
    ///
    /// A missing record becomes [`ImageError::DataValidation`], so callers see
    /// the same error for malformed and unknown GUIDs. Connection and driver
    /// failures pass through.
    pub async fn get_image_details_by_guid(&self, guid: &str) -> Result<ImageDetail, ImageError> {
        let mut ctx = DatabaseContext::enter(self.store.as_ref()).await?;
        let outcome = async {
            ctx.begin_transaction().await?;
            let detail = ctx.records()?.get_by_guid(guid).await?;
            ctx.commit_transaction().await?;
            Ok::<_, ImageError>(detail)
        }
        .await;
        ctx.exit(outcome).await.map_err(|e| collapse_not_found(guid, e))
    }

    /// Read the image bytes behind a record.
    ///
    /// # Errors
    ///
    /// A missing record becomes [`ImageError::DataValidation`]. A record
    /// whose file is gone is reported as [`ImageError::ImageNotFound`].
    pub async fn get_image_content(&self, guid: &str) -> Result<Vec<u8>, ImageError> {
        let mut ctx = DatabaseContext::enter(self.store.as_ref()).await?;
        let outcome = async {
            ctx.begin_transaction().await?;
            let data = ctx.records()?.get_content(guid).await?;
            ctx.commit_transaction().await?;
            Ok::<_, ImageError>(data)
        }
        .await;
        ctx.exit(outcome).await.map_err(|e| collapse_not_found(guid, e))
    }

    /// List every record in insertion order.
    ///
    /// # Errors
    ///
    /// Any store failure after the connection was obtained becomes
    /// [`ImageError::InvalidOperation`].
    pub async fn get_all_image_details(&self) -> Result<Vec<ImageDetail>, ImageError> {
        let mut ctx = DatabaseContext::enter(self.store.as_ref()).await?;
        let outcome = async {
            ctx.begin_transaction().await?;
            let details = ctx.records()?.get_all().await?;
            ctx.commit_transaction().await?;
            Ok::<_, ImageError>(details)
        }
        .await;
        ctx.exit(outcome).await.map_err(|e| {
            debug!(error = %e, "listing failed");
            ImageError::InvalidOperation(LIST_FAILED.to_string())
        })
    }
}

/// Fold "no such record" into a validation error; the missing-file case and
/// everything else pass through.
fn collapse_not_found(guid: &str, err: ImageError) -> ImageError {
    match err {
        ImageError::NotFound(_) => {
            debug!(%guid, "lookup of unknown guid");
            ImageError::DataValidation(INVALID_GUID.to_string())
        }
        other => other,
    }
}
