use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use vellum_core::AllocatorConfig;

const PLACEHOLDER_SECRETS: &[&str] = &["", "dev-secret-change-me", "changeme", "secret"];

/// Server settings, read once from the environment at startup.
#[derive(Debug)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub allocator: AllocatorConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = get("VELLUM_JWT_SECRET").context("VELLUM_JWT_SECRET must be set")?;
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.trim()) {
            bail!("VELLUM_JWT_SECRET is a placeholder; set a real secret");
        }

        let port = match get("VELLUM_PORT") {
            Some(port) => port.parse().context("VELLUM_PORT must be a port number")?,
            None => 3000,
        };

        let mut allocator = AllocatorConfig::default();
        if let Some(attempts) = get("VELLUM_ALLOC_MAX_ATTEMPTS") {
            allocator.max_attempts = attempts
                .parse()
                .context("VELLUM_ALLOC_MAX_ATTEMPTS must be a positive integer")?;
            if allocator.max_attempts == 0 {
                bail!("VELLUM_ALLOC_MAX_ATTEMPTS must be at least 1");
            }
        }
        if let Some(ms) = get("VELLUM_ALLOC_BACKOFF_MS") {
            let ms: u64 = ms.parse().context("VELLUM_ALLOC_BACKOFF_MS must be milliseconds")?;
            allocator.base_backoff = Duration::from_millis(ms);
            allocator.max_backoff = allocator.max_backoff.max(allocator.base_backoff);
        }

        Ok(Self {
            db_path: PathBuf::from(get("VELLUM_DB_PATH").unwrap_or_else(|| "vellum.db".into())),
            host: get("VELLUM_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt_secret,
            allocator,
        })
    }
}
