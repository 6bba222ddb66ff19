use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwks::{JwksFetcher, KeySet};

/// Time-bounded holder for the last successfully fetched key set.
///
/// Failures are never stored, so an outage cannot pin a bad result.
#[derive(Clone)]
pub struct KeySetCache {
    ttl: Duration,
    inner: Arc<RwLock<Option<(Instant, KeySet)>>>,
}

impl KeySetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn get(&self) -> Option<KeySet> {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some((fetched_at, keys)) if fetched_at.elapsed() < self.ttl => Some(keys.clone()),
            _ => None,
        }
    }

    pub fn store(&self, keys: KeySet) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some((Instant::now(), keys));
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.take();
    }
}

/// Verifies bearer tokens against the identity provider's published keys.
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    jwks: JwksFetcher,
    cache: Option<KeySetCache>,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: JwtConfig) -> JwtVerifierBuilder {
        JwtVerifierBuilder::new(config)
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn jwks_fetcher(&self) -> &JwksFetcher {
        &self.jwks
    }

    /// Verify `token` and return its claims.
    ///
    /// Header → key lookup → signature/claims validation. Each step fails with
    /// the matching [`AuthError`] and nothing later runs.
    pub async fn verify(&self, token: &str) -> AuthResult<Claims> {
        let header = decode_header(token).map_err(|err| {
            debug!(error = %err, "rejecting token with undecodable header");
            AuthError::InvalidToken(err.to_string())
        })?;
        let kid = header.kid.ok_or_else(|| {
            debug!("rejecting token without kid");
            AuthError::MissingKeyId
        })?;

        let keys = self.key_set_for(&kid).await?;
        let jwk = keys.find(&kid).ok_or_else(|| {
            debug!(kid, known = keys.len(), "no published key matches token kid");
            AuthError::UnknownKeyId(kid.clone())
        })?;
        let key = jwk.decoding_key(&self.config.algorithms)?;

        let token_data = decode::<Value>(token, &key, &self.validation()).map_err(|err| {
            let mapped = AuthError::from_decode(err);
            debug!(kid, code = mapped.code(), error = ?mapped, "token rejected");
            mapped
        })?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(kid, subject = ?claims.subject, "verified JWT successfully");
        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(
            self.config
                .algorithms
                .first()
                .copied()
                .unwrap_or(Algorithm::RS256),
        );
        validation.algorithms = self.config.algorithms.clone();
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.leeway = 0;
        validation
    }

    /// Key set for a token carrying `kid`. A cached set that lacks the kid is
    /// refreshed once, since the provider may have published a new key.
    async fn key_set_for(&self, kid: &str) -> AuthResult<KeySet> {
        let Some(cache) = &self.cache else {
            return self.jwks.fetch().await;
        };

        if let Some(keys) = cache.get() {
            if keys.find(kid).is_some() {
                return Ok(keys);
            }
        }

        let keys = self.jwks.fetch().await?;
        cache.store(keys.clone());
        Ok(keys)
    }
}

pub struct JwtVerifierBuilder {
    config: JwtConfig,
    jwks: Option<JwksFetcher>,
    client: Option<Client>,
}

impl JwtVerifierBuilder {
    fn new(config: JwtConfig) -> Self {
        Self {
            config,
            jwks: None,
            client: None,
        }
    }

    /// Override the key set location; defaults to the config's domain.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks = Some(JwksFetcher::new(url));
        self
    }

    pub fn with_jwks_fetcher(mut self, fetcher: JwksFetcher) -> Self {
        self.jwks = Some(fetcher);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> JwtVerifier {
        let jwks = match (self.jwks, self.client) {
            (Some(fetcher), Some(client)) => JwksFetcher::with_client(client, fetcher.url()),
            (Some(fetcher), None) => fetcher,
            (None, Some(client)) => JwksFetcher::with_client(client, self.config.jwks_url()),
            (None, None) => JwksFetcher::new(self.config.jwks_url()),
        };
        let cache = self.config.jwks_cache_ttl.map(KeySetCache::new);

        JwtVerifier {
            config: self.config,
            jwks,
            cache,
        }
    }
}
