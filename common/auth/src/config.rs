use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

/// How strictly the `Authorization` header shape is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Reject headers that are not exactly `Bearer <token>`.
    #[default]
    Strict,
    /// Legacy parsing: shape problems are logged and the second header
    /// segment is returned anyway.
    Permissive,
}

/// Runtime configuration for JWT verification against an identity provider.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Identity provider domain, e.g. `tenant.eu.auth0.com`.
    pub domain: String,
    /// Expected audience claim (aud).
    pub audience: String,
    /// Signing algorithms accepted in token headers.
    pub algorithms: Vec<Algorithm>,
    /// How long a fetched key set may be reused. `None` fetches per verification.
    pub jwks_cache_ttl: Option<Duration>,
    pub extraction_mode: ExtractionMode,
}

impl JwtConfig {
    /// Validate the three required settings. Blank values are rejected so a
    /// misconfigured process fails at startup rather than on first request.
    pub fn new(
        domain: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Result<Self, ConfigError> {
        let domain = clean(domain.into()).ok_or(ConfigError::Missing("domain"))?;
        let audience = clean(audience.into()).ok_or(ConfigError::Missing("audience"))?;
        if algorithms.is_empty() {
            return Err(ConfigError::Missing("algorithms"));
        }
        if let Some(alg) = algorithms.iter().find(|alg| !is_rsa_family(**alg)) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{alg:?}")));
        }

        Ok(Self {
            domain,
            audience,
            algorithms,
            jwks_cache_ttl: None,
            extraction_mode: ExtractionMode::Strict,
        })
    }

    pub fn with_jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = Some(ttl);
        self
    }

    pub fn with_extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.extraction_mode = mode;
        self
    }

    /// Expected issuer claim (iss).
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }
}

/// Parse an algorithm list such as `RS256` or `RS256,RS384`. A JSON-style
/// list (`["RS256"]`) is tolerated.
pub fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for item in value.split([',', ' ']) {
        let name = item.trim_matches(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '"' | '\''));
        if name.is_empty() {
            continue;
        }
        let alg = Algorithm::from_str(name)
            .map_err(|_| ConfigError::UnsupportedAlgorithm(name.to_string()))?;
        if !is_rsa_family(alg) {
            return Err(ConfigError::UnsupportedAlgorithm(name.to_string()));
        }
        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::Missing("algorithms"));
    }
    Ok(algorithms)
}

// Published keys are RSA (n/e), so only RSA-family algorithms can verify.
fn is_rsa_family(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}

fn clean(value: String) -> Option<String> {
    let trimmed = value.trim_matches(|c: char| c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
