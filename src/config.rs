use crate::utils::constants::{
    DEFAULT_MAX_IMAGE_BYTES, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPLOAD_DIR,
    UPLOADS_ROUTE,
};
use crate::utils::get_env::{Lookup, get_env_or, get_env_parsed, get_env_var, lookup_env};
use crate::utils::urls::to_url;
use anyhow::{Error, anyhow};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket_name: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub public_url: Url,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { dir: PathBuf, public_url: Url },
    S3(S3Settings),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_image_bytes: usize,
    pub request_timeout: Duration,
    pub retention: Option<Duration>,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env(port_override: Option<u16>) -> Result<Self, Error> {
        Self::from_lookup(port_override, &lookup_env)
    }

    pub fn from_lookup(port_override: Option<u16>, env: Lookup<'_>) -> Result<Self, Error> {
        let port = match port_override {
            Some(port) => port,
            None => get_env_or(env, "PORT", DEFAULT_PORT)?,
        };

        let public_base = match get_env_parsed::<String>(env, "PUBLIC_BASE_URL")? {
            Some(base) => base,
            None => format!("http://localhost:{port}"),
        };

        let storage = match get_env_or(env, "STORAGE_BACKEND", "local".to_string())?.as_str() {
            "local" => StorageConfig::Local {
                dir: get_env_or(env, "UPLOAD_DIR", PathBuf::from(DEFAULT_UPLOAD_DIR))?,
                public_url: to_url(&format!(
                    "{}{}",
                    public_base.trim_end_matches('/'),
                    UPLOADS_ROUTE
                ))?,
            },
            "s3" => StorageConfig::S3(S3Settings {
                bucket_name: get_env_var(env, "S3_BUCKET_NAME")?,
                endpoint: get_env_var(env, "S3_ENDPOINT")?,
                region: get_env_var(env, "S3_REGION")?,
                access_key_id: get_env_var(env, "S3_ACCESS_KEY_ID")?,
                secret_access_key: get_env_var(env, "S3_SECRET_ACCESS_KEY")?,
                public_url: to_url(&get_env_var(env, "S3_PUBLIC_URL")?)?,
            }),
            other => return Err(anyhow!("unknown STORAGE_BACKEND: {other}")),
        };

        Ok(Self {
            port,
            max_image_bytes: get_env_or(env, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            request_timeout: Duration::from_secs(get_env_or(
                env,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            retention: get_env_parsed::<u64>(env, "ARTIFACT_RETENTION_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            storage,
        })
    }
}

#[cfg(test)]
mod cfg_tests {
    use super::{Config, StorageConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(port: Option<u16>, vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(port, &|key: &str| vars.get(key).cloned())
    }

    #[test]
    pub fn test_local_defaults() {
        let config = config_from(Some(9090), &[]).unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.retention.is_none());
        match config.storage {
            StorageConfig::Local { dir, public_url } => {
                assert_eq!(dir, PathBuf::from("uploads"));
                assert_eq!(public_url.as_str(), "http://localhost:9090/uploads");
            }
            other => panic!("expected local storage, got {other:?}"),
        }
    }

    #[test]
    pub fn test_overrides() {
        let config = config_from(
            None,
            &[
                ("PORT", "3000"),
                ("PUBLIC_BASE_URL", "https://img.example.com/"),
                ("UPLOAD_DIR", "/var/lib/shrink0"),
                ("MAX_IMAGE_BYTES", "2048"),
                ("REQUEST_TIMEOUT_SECS", "5"),
                ("ARTIFACT_RETENTION_SECS", "600"),
            ],
        )
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.max_image_bytes, 2048);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.retention, Some(Duration::from_secs(600)));
        match config.storage {
            StorageConfig::Local { dir, public_url } => {
                assert_eq!(dir, PathBuf::from("/var/lib/shrink0"));
                assert_eq!(public_url.as_str(), "https://img.example.com/uploads");
            }
            other => panic!("expected local storage, got {other:?}"),
        }

        // a zero window means keep forever
        let config = config_from(None, &[("ARTIFACT_RETENTION_SECS", "0")]).unwrap();
        assert!(config.retention.is_none());
    }

    #[test]
    pub fn test_s3_backend() {
        let config = config_from(
            None,
            &[
                ("STORAGE_BACKEND", "s3"),
                ("S3_BUCKET_NAME", "artifacts"),
                ("S3_ENDPOINT", "http://127.0.0.1:9000"),
                ("S3_REGION", "eu-central-1"),
                ("S3_ACCESS_KEY_ID", "key"),
                ("S3_SECRET_ACCESS_KEY", "secret"),
                ("S3_PUBLIC_URL", "https://cdn.example.com/artifacts"),
            ],
        )
        .unwrap();

        match config.storage {
            StorageConfig::S3(settings) => {
                assert_eq!(settings.bucket_name, "artifacts");
                assert_eq!(settings.region, "eu-central-1");
                assert_eq!(
                    settings.public_url.as_str(),
                    "https://cdn.example.com/artifacts"
                );
            }
            other => panic!("expected s3 storage, got {other:?}"),
        }

        // credentials are required once s3 is selected
        assert!(config_from(None, &[("STORAGE_BACKEND", "s3")]).is_err());
    }

    #[test]
    pub fn test_invalid_values_are_errors() {
        assert!(config_from(None, &[("STORAGE_BACKEND", "ftp")]).is_err());
        assert!(config_from(None, &[("MAX_IMAGE_BYTES", "ten megs")]).is_err());
        assert!(config_from(None, &[("PORT", "99999")]).is_err());
    }
}
