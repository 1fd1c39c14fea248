//! Image file naming and writing.

use std::io::{self, Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::ImageError;

/// Longest prompt-derived prefix kept in a filename, in characters.
pub const FILENAME_PREFIX_CHARS: usize = 27;

/// Extension of every stored image file.
pub const IMAGE_EXTENSION: &str = "png";

/// Names tried for one prompt and second before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Build a filename from a prompt and a Unix timestamp.
///
/// The first attempt is `<sanitized prompt prefix>_<timestamp>.png`; later
/// attempts append `_<attempt>` before the extension.
#[must_use]
pub fn image_filename(prompt: &str, timestamp: i64, attempt: u32) -> String {
    let prefix = sanitize_for_filename(prompt, FILENAME_PREFIX_CHARS);
    if attempt == 0 {
        format!("{prefix}_{timestamp}.{IMAGE_EXTENSION}")
    } else {
        format!("{prefix}_{timestamp}_{attempt}.{IMAGE_EXTENSION}")
    }
}

/// Sanitize a prompt for use as a filename prefix.
///
/// Whitespace becomes `_`, anything other than alphanumerics, `_` and `-` is
/// dropped, and the result is cut to `max_chars` characters.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_chars: usize) -> String {
    let result: String = input
        .chars()
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some('_')
            } else if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                Some(ch)
            } else {
                None
            }
        })
        .take(max_chars)
        .collect();

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Write image bytes under a filename derived from `prompt` and
/// `timestamp`, creating `dir` if needed. Returns the filename and full path.
///
/// Existing files are never overwritten: a taken name moves on to the next
/// suffixed candidate. Bytes already in PNG form are written as-is; other
/// recognized image formats are re-encoded to PNG first.
///
/// # Errors
///
/// Returns [`ImageError::ImageConversion`] if the bytes are not a recognized
/// image, or [`ImageError::Storage`] if the file cannot be written or every
/// candidate name is taken.
pub async fn save_image(
    dir: &Path,
    prompt: &str,
    timestamp: i64,
    data: &[u8],
) -> Result<(String, PathBuf), ImageError> {
    let png = to_png(data)?;
    tokio::fs::create_dir_all(dir).await?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = image_filename(prompt, timestamp, attempt);
        let path = dir.join(&filename);
        match write_new(&path, &png).await {
            Ok(()) => return Ok((filename, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(ImageError::Storage(e)),
        }
    }

    Err(ImageError::Storage(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free filename for prompt at timestamp {timestamp}"),
    )))
}

/// Create `path` exclusively and fill it; a partial file is removed.
async fn write_new(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path).await?;
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;
    if written.is_err() {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
    }
    written
}

/// Normalize image bytes to PNG.
fn to_png(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    let format = image::guess_format(data)
        .map_err(|e| ImageError::ImageConversion(format!("Unrecognized image data: {e}")))?;
    if format == ImageFormat::Png {
        return Ok(data.to_vec());
    }

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to decode image: {e}")))?;
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to encode PNG: {e}")))?;
    Ok(buf.into_inner())
}
