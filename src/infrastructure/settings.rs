use anyhow::{Context, Result, anyhow};

use crate::media::ProfileImageStore;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub media_root: String,
    pub thumbnail_max_dimension: u32,
    pub default_page_size: u32,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let media_root = get_required("MEDIA_ROOT").context("MEDIA_ROOT is required")?;
        let thumbnail_max_dimension = parse_u32_env(
            "THUMBNAIL_MAX_DIMENSION",
            ProfileImageStore::DEFAULT_MAX_DIMENSION,
        )?;
        let default_page_size = parse_u32_env("DEFAULT_PAGE_SIZE", 10)?;
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            media_root,
            thumbnail_max_dimension,
            default_page_size,
            log_level,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
