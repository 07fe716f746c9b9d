use crate::core::Result;
use crate::utils::constants::{ARTIFACT_EXTENSION, ARTIFACT_PREFIX};
use crate::utils::urls::artifact_url;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// Destination for compressed artifacts. Every `put` creates a new, uniquely
/// named object; nothing is ever overwritten.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, data: Vec<u8>) -> Result<StoredArtifact>;

    /// Deletes artifacts older than `max_age`, returning how many were removed.
    async fn purge_older_than(&self, max_age: Duration) -> Result<usize>;

    /// Directory to serve over HTTP, if the store is filesystem backed.
    fn local_dir(&self) -> Option<&Path> {
        None
    }
}

pub fn new_artifact_name() -> String {
    format!("{}{}.{}", ARTIFACT_PREFIX, Uuid::new_v4(), ARTIFACT_EXTENSION)
}

pub fn is_artifact_name(name: &str) -> bool {
    name.starts_with(ARTIFACT_PREFIX) && name.ends_with(&format!(".{ARTIFACT_EXTENSION}"))
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    public_url: Url,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: Url) -> Self {
        Self {
            dir: dir.into(),
            public_url,
        }
    }

    async fn ensure_dir(&self) -> Result<()> {
        if !fs::try_exists(&self.dir).await? {
            fs::create_dir_all(&self.dir).await?;
            tracing::info!(dir = %self.dir.display(), "created artifact directory");
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn put(&self, data: Vec<u8>) -> Result<StoredArtifact> {
        self.ensure_dir().await?;

        let name = new_artifact_name();
        let path = self.dir.join(&name);
        fs::write(&path, &data).await?;
        let size = fs::metadata(&path).await?.len();

        Ok(StoredArtifact {
            url: artifact_url(&self.public_url, &name),
            name,
            size,
        })
    }

    async fn purge_older_than(&self, max_age: Duration) -> Result<usize> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(0);
        }

        let now = SystemTime::now();
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_artifact_name(name) {
                continue;
            }

            // follows symlinks, so a dangling entry is skipped here rather than aborting the sweep
            let modified = match fs::metadata(entry.path()).await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(file = name, "skipping artifact with unreadable metadata: {e}");
                    continue;
                }
            };
            // files stamped in the future (clock skew) are left alone
            let Ok(age) = now.duration_since(modified) else {
                continue;
            };

            if age >= max_age {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(removed)
    }

    fn local_dir(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}
