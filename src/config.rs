// src/config.rs

use std::{env, net::SocketAddr, time::Duration};

use url::Url;

use crate::error::AppError;

/// Scheme that selects the in-process backend instead of a hosted project.
pub const MEMORY_SCHEME: &str = "memory";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted project, e.g. `https://xyz.supabase.co`.
    pub supabase_url: Url,
    /// Public (anon) API key sent with every request.
    pub supabase_anon_key: String,
    pub bind_addr: SocketAddr,
    /// Adds `Secure` to the session cookie. Enable behind TLS.
    pub cookie_secure: bool,
    pub request_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// `SUPABASE_URL` and `SUPABASE_ANON_KEY` are required; everything else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("{} must be set", key)))
        };

        let raw_url = required("SUPABASE_URL")?;
        let supabase_url = Url::parse(&raw_url)
            .map_err(|e| AppError::Config(format!("SUPABASE_URL is not a valid URL: {}", e)))?;

        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("BIND_ADDR '{}' is invalid: {}", raw, e)))?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("COOKIE_SECURE '{}' is not a bool", raw)))?,
            None => false,
        };

        let timeout_secs: u64 = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Config(format!("REQUEST_TIMEOUT_SECS '{}' is not a number", raw))
            })?,
            None => 10,
        };

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            bind_addr,
            cookie_secure,
            request_timeout: Duration::from_secs(timeout_secs),
            rust_log,
        })
    }

    pub fn uses_memory_backend(&self) -> bool {
        self.supabase_url.scheme() == MEMORY_SCHEME
    }
}
