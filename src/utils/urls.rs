use url::{ParseError, Url};

pub fn to_url(host: &str) -> Result<Url, ParseError> {
    Url::parse(host)
}

/// Joins a public base (with or without trailing slash) and an artifact name.
pub fn artifact_url(base: &Url, name: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), name)
}
