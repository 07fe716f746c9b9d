use anyhow::{Error, anyhow};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

/// Source of configuration values. The process environment in production,
/// a plain map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads from the process environment, loading `.env` first.
pub fn lookup_env(key: &str) -> Option<String> {
    dotenv().ok();
    env::var(key).ok()
}

pub fn get_env_var(lookup: Lookup<'_>, key: &str) -> Result<String, Error> {
    lookup(key).ok_or_else(|| anyhow!("{key}: environment variable not found"))
}

/// Reads an optional variable. Unset or blank values are `None`, values that
/// fail to parse are an error rather than silently falling back.
pub fn get_env_parsed<T>(lookup: Lookup<'_>, key: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("invalid value for {key}: {e}")),
        _ => Ok(None),
    }
}

pub fn get_env_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parsed(lookup, key)?.unwrap_or(default))
}
