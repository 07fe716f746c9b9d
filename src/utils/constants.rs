pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

// 10MB, the image field limit
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
// room for multipart boundaries, part headers and the quality field
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const UPLOADS_ROUTE: &str = "/uploads";
pub const COMPRESS_ROUTE: &str = "/api/v1/compress";

pub const ARTIFACT_PREFIX: &str = "compressed-";
pub const ARTIFACT_EXTENSION: &str = "jpg";
pub const ARTIFACT_CONTENT_TYPE: &str = "image/jpeg";
pub const DOWNLOAD_FILENAME: &str = "compressed-image.jpg";

pub const MAX_RETENTION_SWEEP_SECS: u64 = 3600;
