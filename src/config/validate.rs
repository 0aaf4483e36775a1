use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.jwt_secret_file.trim().is_empty() {
            errors.push("auth.jwt_secret_file must not be empty".to_string());
        }

        if auth.token_ttl_secs == 0 {
            errors.push("auth.token_ttl_secs must be > 0".to_string());
        }
    }

    if cfg.cache.ttl_ms == 0 {
        errors.push("cache.ttl_ms must be > 0".to_string());
    }

    if cfg.pagination.default_limit == 0 {
        errors.push("pagination.default_limit must be > 0".to_string());
    }

    if let Some(storage) = cfg.storage.as_ref() {
        if storage.endpoint.trim().is_empty() {
            errors.push("storage.endpoint must not be empty".to_string());
        }

        if storage.bucket.trim().is_empty() {
            errors.push("storage.bucket must not be empty".to_string());
        }

        if storage.upload_limit_bytes == 0 {
            errors.push("storage.upload_limit_bytes must be > 0".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
