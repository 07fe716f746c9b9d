use crate::server::types::CompressResponse;
use std::fmt;

/// Human readable analytics for a finished compression.
pub struct Analytics<'a>(pub &'a CompressResponse);

fn kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

impl fmt::Display for Analytics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        writeln!(f, "Compressed Image:  {}", result.compressed_image_url)?;
        writeln!(f, "Original Size:     {}", kilobytes(result.original_size))?;
        writeln!(f, "Compressed Size:   {}", kilobytes(result.compressed_size))?;
        writeln!(f, "Compression Ratio: {:.2}%", result.compression_ratio)?;
        write!(f, "Quality Setting:   {}%", result.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_rendering() {
        let response = CompressResponse {
            success: true,
            compressed_image_url: "http://localhost:8080/uploads/compressed-1.jpg".into(),
            original_size: 500_000,
            compressed_size: 123_456,
            compression_ratio: 75.3088,
            quality: 80,
        };

        let rendered = Analytics(&response).to_string();
        assert!(rendered.contains("Original Size:     488.28 KB"));
        assert!(rendered.contains("Compressed Size:   120.56 KB"));
        assert!(rendered.contains("Compression Ratio: 75.31%"));
        assert!(rendered.ends_with("Quality Setting:   80%"));
    }

    #[test]
    fn test_negative_ratio_is_shown() {
        let response = CompressResponse {
            success: true,
            compressed_image_url: "http://x/compressed-2.jpg".into(),
            original_size: 1024,
            compressed_size: 2048,
            compression_ratio: -100.0,
            quality: 100,
        };
        assert!(Analytics(&response).to_string().contains("-100.00%"));
    }
}
