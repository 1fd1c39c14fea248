//! Live adapter for OpenAI-compatible image generation APIs.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, ImageGenerator, ImageRequest,
};

/// Live generator that calls the `images/generations` endpoint.
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiGenerator {
    /// Create a generator for the API rooted at `base_url`.
    ///
    /// Every call is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, ImageError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/images/generations", base_url.trim_end_matches('/'));
        Ok(Self { client, endpoint, api_key })
    }
}

impl ImageGenerator for OpenAiGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "model": request.model,
                "prompt": request.prompt,
                "n": 1,
                "style": request.style.as_str(),
                "quality": request.quality.as_str(),
                "size": request.size.as_str(),
                "response_format": "b64_json",
            });

            debug!(endpoint = %self.endpoint, model = %request.model, "calling generation API");
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(ImageError::Generation {
                    status: status.as_u16(),
                    message: response_text,
                });
            }

            decode_response(&response_text)
        })
    }
}

/// Pull the first base64 image out of a successful response body.
fn decode_response(response_text: &str) -> Result<GeneratedImage, ImageError> {
    let parsed: OpenAiResponse = serde_json::from_str(response_text).map_err(|e| {
        ImageError::Generation { status: 200, message: format!("Failed to parse response: {e}") }
    })?;

    let Some(item) = parsed.data.into_iter().next() else {
        let truncated: String = response_text.chars().take(500).collect();
        return Err(ImageError::Generation {
            status: 200,
            message: format!("No images in response. Body: {truncated}"),
        });
    };

    let data = base64::engine::general_purpose::STANDARD.decode(&item.b64_json).map_err(|e| {
        ImageError::Generation { status: 200, message: format!("Failed to decode base64: {e}") }
    })?;
    Ok(GeneratedImage { data })
}

// --- OpenAI API response types ---

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: String,
}
