//! Axum router for the `/image` API.
//!
//! | Method | Path                   | Response                    |
//! |--------|------------------------|-----------------------------|
//! | POST   | `/image/`              | created `ImageDetail`       |
//! | GET    | `/image/`              | every `ImageDetail`         |
//! | GET    | `/image/{guid}`        | one `ImageDetail`           |
//! | GET    | `/image/{guid}/content`| PNG bytes                   |
//!
//! The collection routes also answer without the trailing slash.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use tracing::debug;

use crate::error::ImageError;
use crate::middleware::request_trace;
use crate::model::{ImageDetail, ImageDetailCreate};
use crate::service::ImageService;

/// Build the application router around `service`.
pub fn build(service: Arc<ImageService>) -> Router {
    Router::new()
        .route("/image/", get(list_images).post(create_image))
        .route("/image", get(list_images).post(create_image))
        .route("/image/{guid}", get(get_image))
        .route("/image/{guid}/content", get(get_image_content))
        .fallback(endpoint_not_found)
        .layer(middleware::from_fn(request_trace))
        .with_state(service)
}

async fn create_image(
    State(service): State<Arc<ImageService>>,
    body: Result<Json<ImageDetailCreate>, JsonRejection>,
) -> Result<Json<ImageDetail>, ImageError> {
    let Json(request) = body.map_err(|e| ImageError::BadRequest(e.body_text()))?;
    debug!(prompt = %request.prompt, "create image request");
    let detail = service.create_image(&request).await?;
    Ok(Json(detail))
}

async fn list_images(
    State(service): State<Arc<ImageService>>,
) -> Result<Json<Vec<ImageDetail>>, ImageError> {
    Ok(Json(service.get_all_image_details().await?))
}

async fn get_image(
    State(service): State<Arc<ImageService>>,
    Path(guid): Path<String>,
) -> Result<Json<ImageDetail>, ImageError> {
    Ok(Json(service.get_image_details_by_guid(&guid).await?))
}

async fn get_image_content(
    State(service): State<Arc<ImageService>>,
    Path(guid): Path<String>,
) -> Result<impl IntoResponse, ImageError> {
    let data = service.get_image_content(&guid).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], data))
}

async fn endpoint_not_found(uri: Uri) -> ImageError {
    ImageError::EndpointNotFound(uri.path().to_string())
}
