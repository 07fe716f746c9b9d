use crate::client::FormError;
use crate::server::types::{CompressResponse, ErrorResponse};
use crate::utils::constants::{COMPRESS_ROUTE, DEFAULT_QUALITY, DOWNLOAD_FILENAME};
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Idle,
    Uploading,
    Success(CompressResponse),
    Error(String),
}

#[derive(Debug)]
struct Inputs {
    image: Option<PathBuf>,
    quality: String,
    /// Bumped on every `select_image`, so a response for an older pick is dropped.
    selection: u64,
}

/// Client-side controller for one upload form. Shareable across tasks; only
/// one compression may be in flight at a time.
#[derive(Debug)]
pub struct UploadForm {
    http_client: Client,
    endpoint: Url,
    inputs: Mutex<Inputs>,
    state: Mutex<FormState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Puts the form back to Idle if a compress future is dropped mid-upload.
struct UploadingGuard<'a> {
    state: &'a Mutex<FormState>,
}

impl Drop for UploadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if *state == FormState::Uploading {
            *state = FormState::Idle;
        }
    }
}

impl UploadForm {
    pub fn new(server: &Url) -> Result<Self, FormError> {
        Ok(Self {
            http_client: Client::new(),
            endpoint: server.join(COMPRESS_ROUTE)?,
            inputs: Mutex::new(Inputs {
                image: None,
                quality: DEFAULT_QUALITY.to_string(),
                selection: 0,
            }),
            state: Mutex::new(FormState::Idle),
        })
    }

    /// Picks the file to upload. Nothing is validated here; unreadable or
    /// non-image files fail at `compress` time. Any previous result is dropped.
    pub fn select_image(&self, path: impl Into<PathBuf>) {
        {
            let mut inputs = lock(&self.inputs);
            inputs.image = Some(path.into());
            inputs.selection += 1;
        }

        let mut state = lock(&self.state);
        if *state != FormState::Uploading {
            *state = FormState::Idle;
        }
    }

    /// Stores the raw slider value as given; the server interprets it.
    pub fn set_quality(&self, value: impl ToString) {
        lock(&self.inputs).quality = value.to_string();
    }

    pub fn state(&self) -> FormState {
        lock(&self.state).clone()
    }

    pub fn result(&self) -> Option<CompressResponse> {
        match &*lock(&self.state) {
            FormState::Success(result) => Some(result.clone()),
            _ => None,
        }
    }

    /// Uploads the selected image. The outcome is always returned, but it only
    /// lands in the form state if no other image was selected meanwhile.
    pub async fn compress(&self) -> Result<CompressResponse, FormError> {
        let (image, quality, selection) = {
            let inputs = lock(&self.inputs);
            let image = inputs.image.clone().ok_or(FormError::NoImageSelected)?;
            (image, inputs.quality.clone(), inputs.selection)
        };

        {
            let mut state = lock(&self.state);
            if *state == FormState::Uploading {
                return Err(FormError::Busy);
            }
            *state = FormState::Uploading;
        }
        let _guard = UploadingGuard { state: &self.state };

        let outcome = self.upload(&image, quality).await;

        let mut state = lock(&self.state);
        if lock(&self.inputs).selection != selection {
            tracing::debug!("discarding outcome for a replaced image selection");
            *state = FormState::Idle;
            return outcome;
        }
        *state = match &outcome {
            Ok(result) => FormState::Success(result.clone()),
            Err(e) => {
                tracing::warn!("compression request failed: {e:?}");
                FormState::Error(e.to_string())
            }
        };
        outcome
    }

    async fn upload(&self, image_path: &Path, quality: String) -> Result<CompressResponse, FormError> {
        let data = tokio::fs::read(image_path).await?;
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let mut part = Part::bytes(data).file_name(file_name);
        if let Ok(format) = image::ImageFormat::from_path(image_path) {
            part = part
                .mime_str(format.to_mime_type())
                .map_err(FormError::Network)?;
        }
        let form = Form::new().part("image", part).text("quality", quality);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(FormError::Network)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<CompressResponse>()
                .await
                .map_err(FormError::Network);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.message)
            .filter(|message| !message.trim().is_empty());
        Err(FormError::Server { status, message })
    }

    /// Saves the last compressed artifact as `dir/compressed-image.jpg`.
    /// Returns `None` when there is no result to download yet.
    pub async fn download(&self, dir: &Path) -> Result<Option<PathBuf>, FormError> {
        let Some(result) = self.result() else {
            return Ok(None);
        };

        let response = self
            .http_client
            .get(&result.compressed_image_url)
            .send()
            .await
            .map_err(FormError::Network)?;
        if !response.status().is_success() {
            return Err(FormError::Download(response.status()));
        }

        tokio::fs::create_dir_all(dir).await?;
        let target = dir.join(DOWNLOAD_FILENAME);

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        let mut stream_reader = StreamReader::new(stream);
        let mut file = tokio::fs::File::create(&target).await?;
        let written = tokio::io::copy(&mut stream_reader, &mut file).await?;
        file.flush().await?;

        tracing::info!(path = %target.display(), bytes = written, "artifact downloaded");
        Ok(Some(target))
    }
}
