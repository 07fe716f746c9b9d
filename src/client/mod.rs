//! Upload form controller: the client half of the compress endpoint.
//!
//! Holds the selected image and the raw quality value, performs the multipart
//! upload and keeps the last outcome around for rendering and download.

pub mod form;
pub mod report;

pub use form::{FormState, UploadForm};
pub use report::Analytics;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Please upload an image first")]
    NoImageSelected,

    #[error("A compression is already in progress")]
    Busy,

    /// Non-2xx answer from the endpoint, with its `message` if it sent one
    #[error("{}", .message.as_deref().unwrap_or("Something went wrong"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    /// The endpoint could not be reached or its answer could not be read
    #[error("Error compressing image")]
    Network(#[source] reqwest::Error),

    #[error("Download failed with status {0}")]
    Download(StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}
