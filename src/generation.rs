//! Generation client: prompt in, stored image and record out.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ImageError;
use crate::guid::make_guid;
use crate::model::{ImageDetail, ImageDetailCreate};
use crate::output::save_image;
use crate::params::GenerationOptions;
use crate::ports::{ImageGenerator, ImageRequest};
use crate::transaction::DatabaseContext;

/// Turns a prompt into an image file plus a record in the caller's
/// transaction.
pub struct ImageGeneration {
    generator: Arc<dyn ImageGenerator>,
    options: GenerationOptions,
    images_dir: PathBuf,
}

impl ImageGeneration {
    /// Create a generation client writing files into `images_dir`.
    #[must_use]
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        options: GenerationOptions,
        images_dir: PathBuf,
    ) -> Self {
        Self { generator, options, images_dir }
    }

    /// Generate with the configured provider options.
    ///
    /// # Errors
    ///
    /// See [`ImageGeneration::generate_with_options`].
    pub async fn generate(
        &self,
        ctx: &mut DatabaseContext,
        request: &ImageDetailCreate,
    ) -> Result<ImageDetail, ImageError> {
        self.generate_with_options(ctx, request, &self.options).await
    }

    /// Call the provider, store the image under a fresh filename and insert
    /// its record through `ctx`. Nothing is committed here.
    ///
    /// The file is written only after the provider answered with a decodable
    /// image, so a provider failure leaves neither file nor row behind. It is
    /// always a new file; if the insert fails, only that file is removed.
    ///
    /// # Errors
    ///
    /// Provider failures surface as [`ImageError::Generation`] or
    /// [`ImageError::Network`], undecodable payloads as
    /// [`ImageError::ImageConversion`], disk failures as
    /// [`ImageError::Storage`], and insert failures as the store reports them.
    pub async fn generate_with_options(
        &self,
        ctx: &mut DatabaseContext,
        request: &ImageDetailCreate,
        options: &GenerationOptions,
    ) -> Result<ImageDetail, ImageError> {
        if !ctx.in_transaction() {
            return Err(ImageError::Internal("generation requires an open transaction".into()));
        }

        let image_request = ImageRequest {
            model: options.model.clone(),
            prompt: request.prompt.clone(),
            style: options.style,
            quality: options.quality,
            size: options.size,
        };
        let generated = self.generator.generate(&image_request).await?;

        let timestamp = chrono::Utc::now().timestamp();
        let guid = make_guid();
        let (filename, path) =
            save_image(&self.images_dir, &request.prompt, timestamp, &generated.data).await?;
        info!(%guid, %filename, bytes = generated.data.len(), "image saved");

        let record = ImageDetail { prompt: request.prompt.clone(), guid, filename };
        match ctx.records()?.create(record).await {
            Ok(record) => Ok(record),
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %remove_err, "failed to remove orphaned image");
                }
                Err(e)
            }
        }
    }
}
