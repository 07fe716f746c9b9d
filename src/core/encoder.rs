use crate::core::Result;
use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage};

/// Lossy re-encoder invoked once per upload.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode(&self, data: Bytes, quality: u8) -> Result<Vec<u8>>;
}

/// Decodes any format the `image` crate recognises and writes baseline JPEG.
#[derive(Debug, Default, Clone)]
pub struct JpegReencoder;

impl JpegReencoder {
    pub fn new() -> Self {
        Self
    }

    fn encode_sync(data: &[u8], quality: u8) -> Result<Vec<u8>> {
        let image = image::load_from_memory(data)?;
        let mut out = Vec::with_capacity(data.len() / 2);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);

            // JPEG has no alpha channel, so alpha is dropped here
            match image.color() {
                ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                    encoder.encode_image(&image.to_luma8())?
                }
                _ => encoder.encode_image(&to_rgb(image))?,
            }
        }

        Ok(out)
    }
}

fn to_rgb(image: DynamicImage) -> image::RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

#[async_trait]
impl ImageEncoder for JpegReencoder {
    async fn encode(&self, data: Bytes, quality: u8) -> Result<Vec<u8>> {
        let started = std::time::Instant::now();
        let input_len = data.len();

        let encoded =
            tokio::task::spawn_blocking(move || Self::encode_sync(&data, quality)).await??;

        tracing::debug!(
            input_bytes = input_len,
            output_bytes = encoded.len(),
            quality,
            elapsed = ?started.elapsed(),
            "jpeg re-encode finished"
        );
        Ok(encoded)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::Error;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Deterministic noisy PNG; noise keeps JPEG quality differences visible.
    pub(crate) fn noisy_png(width: u32, height: u32) -> Vec<u8> {
        let mut seed: u32 = 0x2545_F491;
        let img = RgbImage::from_fn(width, height, |x, y| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let n = (seed >> 24) as u8;
            Rgb([n, (x as u8).wrapping_add(n / 2), (y as u8) ^ n])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn transparent_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 128, 255, 64]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_reencode_produces_jpeg_with_same_dimensions() {
        let encoder = JpegReencoder::new();
        let out = encoder
            .encode(Bytes::from(noisy_png(64, 48)), 80)
            .await
            .unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[tokio::test]
    async fn test_lower_quality_is_smaller() {
        let encoder = JpegReencoder::new();
        let png = Bytes::from(noisy_png(128, 128));

        let low = encoder.encode(png.clone(), 1).await.unwrap();
        let high = encoder.encode(png, 100).await.unwrap();

        assert!(
            low.len() < high.len(),
            "q1 = {} bytes, q100 = {} bytes",
            low.len(),
            high.len()
        );
    }

    #[tokio::test]
    async fn test_alpha_is_flattened() {
        let encoder = JpegReencoder::new();
        let out = encoder
            .encode(Bytes::from(transparent_png()), 90)
            .await
            .unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_corrupt_input_is_an_image_error() {
        let encoder = JpegReencoder::new();
        let err = encoder
            .encode(Bytes::from_static(b"definitely not an image"), 80)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}
