/// Outcome of one successful compression.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub artifact_url: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub quality: u8,
}

impl CompressionResult {
    pub fn new(artifact_url: String, original_size: u64, compressed_size: u64, quality: u8) -> Self {
        Self {
            artifact_url,
            original_size,
            compressed_size,
            compression_ratio: compression_ratio(original_size, compressed_size),
            quality,
        }
    }
}

/// Percentage saved going from `original` to `compressed` bytes. Negative when
/// the re-encode is larger than the input; zero for an empty original.
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_reduction() {
        assert!((compression_ratio(1000, 250) - 75.0).abs() < f64::EPSILON);
        assert!((compression_ratio(500_000, 500_000)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_inflation_is_negative() {
        let ratio = compression_ratio(100, 150);
        assert!((ratio + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_empty_original() {
        assert_eq!(compression_ratio(0, 42), 0.0);
    }

    #[test]
    fn test_result_carries_ratio() {
        let result = CompressionResult::new("http://x/compressed-1.jpg".into(), 2048, 512, 80);
        assert_eq!(result.quality, 80);
        assert!((result.compression_ratio - 75.0).abs() < 1e-9);
    }
}
