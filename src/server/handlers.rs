use crate::core::analytics::CompressionResult;
use crate::server::error::ApiError;
use crate::server::types::{AppState, CompressResponse};
use crate::utils::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::Json;
use bytes::{Bytes, BytesMut};
use serde_json::{Value, json};
use std::sync::Arc;

// server status handler
pub async fn server_status_handler() -> Json<Value> {
    Json(json!({"status": "running"}))
}

/// Absent or non-numeric quality falls back to the default; numbers are
/// truncated and clamped to 1..=100.
pub fn parse_quality(raw: Option<&str>) -> u8 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_QUALITY;
    };

    let parsed = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    });

    match parsed {
        Some(q) => q.clamp(MIN_QUALITY as i64, MAX_QUALITY as i64) as u8,
        None => DEFAULT_QUALITY,
    }
}

// reads the image part chunk by chunk, bailing out as soon as it passes the limit
async fn read_image_field(mut field: Field<'_>, limit: usize) -> Result<Bytes, ApiError> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::from_multipart(e, limit))?
    {
        if buffer.len() + chunk.len() > limit {
            tracing::debug!(limit, read = buffer.len() + chunk.len(), "image field over limit");
            return Err(ApiError::PayloadTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer.freeze())
}

pub async fn compress_image_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CompressResponse>, ApiError> {
    let start_time = std::time::Instant::now();
    let limit = state.max_image_bytes;

    // a body that is not multipart at all cannot carry an image
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("multipart rejected: {}", rejection.body_text());
        ApiError::MissingImage
    })?;

    let mut image: Option<Bytes> = None;
    let mut quality_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, limit))?
    {
        match field.name() {
            Some("image") => image = Some(read_image_field(field, limit).await?),
            Some("quality") => {
                quality_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::from_multipart(e, limit))?,
                )
            }
            _ => {} // Ignore other fields
        }
    }

    let image = image.filter(|b| !b.is_empty()).ok_or(ApiError::MissingImage)?;
    let quality = parse_quality(quality_raw.as_deref());
    let original_size = image.len() as u64;

    let encoded = state.encoder.encode(image, quality).await?;
    let artifact = state.store.put(encoded).await?;

    let result = CompressionResult::new(artifact.url, original_size, artifact.size, quality);
    tracing::info!(
        artifact = %artifact.name,
        original_size,
        compressed_size = result.compressed_size,
        ratio = result.compression_ratio,
        quality,
        elapsed = ?start_time.elapsed(),
        "image compressed"
    );

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::parse_quality;

    #[test]
    fn test_parse_quality_defaults() {
        assert_eq!(parse_quality(None), 80);
        assert_eq!(parse_quality(Some("")), 80);
        assert_eq!(parse_quality(Some("high")), 80);
        assert_eq!(parse_quality(Some("NaN")), 80);
    }

    #[test]
    fn test_parse_quality_clamps() {
        assert_eq!(parse_quality(Some("55")), 55);
        assert_eq!(parse_quality(Some(" 42 ")), 42);
        assert_eq!(parse_quality(Some("0")), 1);
        assert_eq!(parse_quality(Some("-20")), 1);
        assert_eq!(parse_quality(Some("250")), 100);
        assert_eq!(parse_quality(Some("99999999999999999999")), 100);
        assert_eq!(parse_quality(Some("75.9")), 75);
    }
}
