use crate::config::S3Settings;
use crate::core::storage::{ArtifactStore, StoredArtifact, new_artifact_name};
use crate::core::{Error, Result};
use crate::utils::constants::ARTIFACT_CONTENT_TYPE;
use crate::utils::urls::artifact_url;
use async_trait::async_trait;
use aws_config::Region;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::config::{Credentials, RequestChecksumCalculation};
use aws_sdk_s3::{Client, Config};
use std::time::Duration;
use url::Url;

pub fn init_s3_client(settings: &S3Settings) -> Client {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        None, // session token
        None, // expiration
        "shrink0",
    );

    let retry_config = RetryConfig::standard()
        .with_max_attempts(5)
        .with_initial_backoff(Duration::from_millis(100))
        .with_max_backoff(Duration::from_secs(5));

    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(120))
        .operation_attempt_timeout(Duration::from_secs(30))
        .build();

    let config = Config::builder()
        .region(Region::new(settings.region.clone()))
        .endpoint_url(settings.endpoint.clone())
        .force_path_style(true)
        // plain bodies for S3-compatible stores that reject aws-chunked uploads
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .credentials_provider(credentials)
        .retry_config(retry_config)
        .timeout_config(timeout_config)
        .behavior_version_latest()
        .build();

    Client::from_conf(config)
}

/// Artifacts stored as objects in an S3-compatible bucket. Public retrieval
/// goes through the bucket's own URL, so this store serves nothing locally.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket_name: String,
    public_url: Url,
}

impl S3Store {
    pub fn new(settings: &S3Settings) -> Self {
        Self {
            client: init_s3_client(settings),
            bucket_name: settings.bucket_name.clone(),
            public_url: settings.public_url.clone(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn put(&self, data: Vec<u8>) -> Result<StoredArtifact> {
        let name = new_artifact_name();
        let size = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&name)
            .content_type(ARTIFACT_CONTENT_TYPE)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| Error::ObjectStore(format!("put {name}: {e}")))?;

        Ok(StoredArtifact {
            url: artifact_url(&self.public_url, &name),
            name,
            size,
        })
    }

    async fn purge_older_than(&self, _max_age: Duration) -> Result<usize> {
        tracing::debug!(
            bucket = %self.bucket_name,
            "artifact expiry is left to the bucket lifecycle policy"
        );
        Ok(0)
    }
}
