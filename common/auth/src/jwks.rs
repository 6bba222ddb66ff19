use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AuthError, AuthResult};

/// Fetches the identity provider's published key set.
#[derive(Clone)]
pub struct JwksFetcher {
    client: Client,
    url: String,
}

impl JwksFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the key set. Transport, status, and body failures all surface as
    /// [`AuthError::JwksUnavailable`]; nothing is retried.
    pub async fn fetch(&self) -> AuthResult<KeySet> {
        let response = self.client.get(&self.url).send().await.map_err(|err| {
            warn!(url = %self.url, error = %err, "JWKS request failed");
            AuthError::JwksUnavailable(err.to_string())
        })?;

        if !response.status().is_success() {
            warn!(url = %self.url, status = %response.status(), "JWKS endpoint returned error status");
            return Err(AuthError::JwksUnavailable(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        response.json::<KeySet>().await.map_err(|err| {
            warn!(url = %self.url, error = %err, "JWKS body could not be decoded");
            AuthError::JwksUnavailable(err.to_string())
        })
    }
}

/// Parsed `{"keys": [...]}` document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct KeySet {
    pub keys: Vec<JsonWebKey>,
}

impl KeySet {
    /// First key whose `kid` equals the token header's key id.
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One published key record. Fields are optional so that a provider
/// publishing an unrelated key type does not break parsing of the whole set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct JsonWebKey {
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub kty: Option<String>,
    #[serde(default, rename = "use")]
    pub usage: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

impl JsonWebKey {
    /// Reconstruct an RSA verification key from the modulus and exponent.
    /// A published `alg` must be one of `accepted`.
    pub fn decoding_key(&self, accepted: &[Algorithm]) -> AuthResult<DecodingKey> {
        let kid = self.kid.as_deref().unwrap_or_default();
        match self.kty.as_deref() {
            Some("RSA") => {}
            other => {
                return Err(AuthError::InvalidToken(format!(
                    "JWKS key '{kid}' has unsupported key type {other:?}"
                )))
            }
        }
        if let Some(usage) = self.usage.as_deref() {
            if usage != "sig" {
                return Err(AuthError::InvalidToken(format!(
                    "JWKS key '{kid}' is not a signing key (use={usage})"
                )));
            }
        }

        if let Some(alg) = self.alg.as_deref() {
            let allowed = Algorithm::from_str(alg)
                .map(|alg| accepted.contains(&alg))
                .unwrap_or(false);
            if !allowed {
                return Err(AuthError::InvalidToken(format!(
                    "JWKS key '{kid}' is published for unaccepted algorithm {alg}"
                )));
            }
        }

        let (Some(modulus), Some(exponent)) = (self.n.as_deref(), self.e.as_deref()) else {
            return Err(AuthError::InvalidToken(format!(
                "JWKS key '{kid}' missing RSA components"
            )));
        };

        DecodingKey::from_rsa_components(modulus, exponent)
            .map_err(|err| AuthError::InvalidToken(format!("JWKS key '{kid}': {err}")))
    }
}
