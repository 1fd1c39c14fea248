//! Image generator port for the external generation provider.

use std::future::Future;
use std::pin::Pin;

use crate::error::ImageError;
use crate::params::{ImageSize, Quality, Style};

/// A request to generate one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Provider model name (e.g., `"dall-e-3"`).
    pub model: String,
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Rendering style.
    pub style: Style,
    /// Detail level.
    pub quality: Quality,
    /// Output dimensions.
    pub size: ImageSize,
}

/// A generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Raw image bytes (decoded from base64).
    pub data: Vec<u8>,
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedImage, ImageError>> + Send + 'a>>;

/// Generates images from text prompts via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for the given request.
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_>;
}
