use std::env;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use common_auth::{parse_algorithms, ExtractionMode, JwtConfig};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub jwt: JwtConfig,
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    load_from(|key| env::var(key).ok())
}

/// Build the configuration from a variable lookup. Required values that are
/// missing or blank abort startup.
pub fn load_from<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).and_then(|value| normalize_optional(&value));
    let require = |key: &str| get(key).ok_or_else(|| anyhow!("{key} must be set"));

    let domain = require("AUTH0_DOMAIN")?;
    let audience = require("API_AUDIENCE")?;
    let algorithms =
        parse_algorithms(&require("ALGORITHMS")?).context("Failed to parse ALGORITHMS")?;
    let mut jwt = JwtConfig::new(domain, audience, algorithms)
        .context("Invalid identity provider configuration")?;

    if let Some(raw) = get("JWKS_CACHE_TTL_SECS") {
        let secs: u64 = raw
            .parse()
            .with_context(|| format!("Failed to parse JWKS_CACHE_TTL_SECS '{raw}'"))?;
        if secs > 0 {
            jwt = jwt.with_jwks_cache_ttl(Duration::from_secs(secs));
        }
    }
    if bool_from(get("AUTH_PERMISSIVE_HEADER")).unwrap_or(false) {
        jwt = jwt.with_extraction_mode(ExtractionMode::Permissive);
    }

    let database_url = require("DATABASE_URL")?;

    let host = get("HOST")
        .unwrap_or_else(|| "0.0.0.0".to_string())
        .parse()
        .context("Failed to parse HOST")?;
    let port = match get("PORT") {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Failed to parse PORT '{raw}'"))?,
        None => 8080,
    };

    let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
        .map(|value| {
            value
                .split(',')
                .filter_map(normalize_optional)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Ok(ServiceConfig {
        jwt,
        database_url,
        host,
        port,
        cors_allowed_origins,
    })
}

fn bool_from(value: Option<String>) -> Option<bool> {
    value.map(|value| {
        matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

// Deployment env files are sometimes saved with CRLF endings.
fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
