//! In-memory adapter for the `ImageGenerator` port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, ImageGenerator, ImageRequest,
};

/// Serves a fixed payload (or a fixed failure) for every request.
pub struct MemoryImageGenerator {
    outcome: Result<Vec<u8>, (u16, String)>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ImageRequest>>,
}

impl MemoryImageGenerator {
    /// A generator that always returns `data`.
    #[must_use]
    pub fn returning(data: Vec<u8>) -> Self {
        Self::with_outcome(Ok(data))
    }

    /// A generator that always fails as the provider would with `status`.
    #[must_use]
    pub fn failing(status: u16, message: &str) -> Self {
        Self::with_outcome(Err((status, message.to_string())))
    }

    fn with_outcome(outcome: Result<Vec<u8>, (u16, String)>) -> Self {
        Self { outcome, calls: AtomicUsize::new(0), last_request: Mutex::new(None) }
    }

    /// Number of generate calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ImageRequest> {
        self.last_request.lock().expect("request lock poisoned").clone()
    }
}

impl ImageGenerator for MemoryImageGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("request lock poisoned") = Some(request.clone());
        let result = match &self.outcome {
            Ok(data) => Ok(GeneratedImage { data: data.clone() }),
            Err((status, message)) => {
                Err(ImageError::Generation { status: *status, message: message.clone() })
            }
        };
        Box::pin(async move { result })
    }
}
