//! Service context that bundles all port trait objects.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapters::live::mysql::MySqlRecordStore;
use crate::adapters::live::openai::OpenAiGenerator;
use crate::config::Config;
use crate::error::ImageError;
use crate::generation::ImageGeneration;
use crate::params::GenerationOptions;
use crate::ports::{ImageGenerator, RecordStore};
use crate::service::ImageService;

/// Bundles the port implementations for one run mode.
pub struct ServiceContext {
    /// Image generation provider.
    pub generator: Arc<dyn ImageGenerator>,
    /// Pooled record persistence.
    pub store: Arc<dyn RecordStore>,
    options: GenerationOptions,
    images_dir: PathBuf,
}

impl ServiceContext {
    /// Bundle already-built adapters.
    #[must_use]
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        store: Arc<dyn RecordStore>,
        options: GenerationOptions,
        images_dir: PathBuf,
    ) -> Self {
        Self { generator, store, options, images_dir }
    }

    /// Create the production context: the OpenAI-compatible provider and the
    /// MySQL pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the database
    /// is unreachable.
    pub async fn live(config: &Config, options: GenerationOptions) -> Result<Self, ImageError> {
        let provider = &config.provider;
        let generator = OpenAiGenerator::new(
            &provider.base_url,
            provider.api_key.clone(),
            Duration::from_secs(provider.timeout_secs),
        )?;

        let images_dir = config.server.images_dir.clone();
        let store = MySqlRecordStore::connect(&config.database, images_dir.clone()).await?;
        info!(
            host = %config.database.host,
            database = %config.database.name,
            pool_size = config.database.pool_size,
            "database ready"
        );

        Ok(Self::new(Arc::new(generator), Arc::new(store), options, images_dir))
    }

    /// Build the orchestration service over this context's adapters.
    #[must_use]
    pub fn image_service(&self) -> ImageService {
        let generation = ImageGeneration::new(
            Arc::clone(&self.generator),
            self.options.clone(),
            self.images_dir.clone(),
        );
        ImageService::new(Arc::clone(&self.store), generation)
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;

    use super::*;
    use crate::adapters::memory::{MemoryImageGenerator, MemoryRecordStore};
    use crate::guid::make_guid;
    use crate::model::ImageDetailCreate;
    use crate::output::tests::sample_image;
    use crate::params::Style;

    #[tokio::test]
    async fn service_uses_bundled_adapters_and_options() {
        let dir = std::env::temp_dir().join(format!("pixyproxy_ctx_{}", make_guid()));
        let generator = Arc::new(MemoryImageGenerator::returning(sample_image(ImageFormat::Png)));
        let store = Arc::new(MemoryRecordStore::new(1, dir.clone()));
        let options = GenerationOptions { style: Style::Natural, ..GenerationOptions::default() };
        let ctx = ServiceContext::new(
            Arc::clone(&generator) as Arc<dyn ImageGenerator>,
            Arc::clone(&store) as Arc<dyn RecordStore>,
            options,
            dir.clone(),
        );

        let detail = ctx
            .image_service()
            .create_image(&ImageDetailCreate { prompt: "a cat".into() })
            .await
            .unwrap();

        assert_eq!(store.records(), vec![detail.clone()]);
        assert!(dir.join(&detail.filename).exists());
        assert_eq!(generator.last_request().unwrap().style, Style::Natural);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
