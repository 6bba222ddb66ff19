//! Token and key-set fixtures for tests.
//!
//! Enabled for this crate's unit tests and, through the `test-helpers`
//! feature, for downstream service tests. RSA key generation is slow in debug
//! builds, so the key pairs are generated once per test binary.

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use httpmock::prelude::*;
use httpmock::Mock;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Map, Value};

use crate::config::JwtConfig;
use crate::jwks::JsonWebKey;

pub const TEST_DOMAIN: &str = "casting.test.auth0.com";
pub const TEST_AUDIENCE: &str = "casting-api";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub struct TestKeys {
    pub kid: String,
    pub modulus: String,
    pub exponent: String,
    encoding: EncodingKey,
}

impl TestKeys {
    fn generate(kid: &str) -> Self {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        let public_key = private_key.to_public_key();
        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");

        Self {
            kid: kid.to_string(),
            modulus: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            exponent: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            encoding: EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("encoding key"),
        }
    }

    /// JWKS entry as an identity provider would publish it.
    pub fn jwk(&self) -> Value {
        json!({
            "kid": self.kid,
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "n": self.modulus,
            "e": self.exponent,
        })
    }

    pub fn jwk_record(&self) -> JsonWebKey {
        serde_json::from_value(self.jwk()).expect("jwk record")
    }

    pub fn jwks(&self) -> Value {
        json!({ "keys": [self.jwk()] })
    }
}

/// Primary signing key, published in mocked key sets.
pub fn test_keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(|| TestKeys::generate("test-key-1"))
}

/// A second key pair, used to sign tokens the published set cannot verify.
///
/// It deliberately reuses the kid of [`test_keys`], so a token it signs finds
/// a published key and fails on the signature rather than on the kid lookup.
pub fn rogue_keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(|| TestKeys::generate("test-key-1"))
}

/// Configuration matching tokens minted by [`TokenBuilder::new`].
pub fn test_config() -> JwtConfig {
    JwtConfig::new(TEST_DOMAIN, TEST_AUDIENCE, vec![Algorithm::RS256]).expect("test config")
}

/// Serve `keys` at [`JWKS_PATH`] on the mock server.
pub async fn mock_jwks<'a>(server: &'a MockServer, keys: &TestKeys) -> Mock<'a> {
    let body = keys.jwks().to_string();
    server
        .mock_async(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
        .await
}

pub struct TokenBuilder {
    kid: Option<String>,
    claims: Map<String, Value>,
}

impl TokenBuilder {
    /// Token for [`TEST_DOMAIN`]/[`TEST_AUDIENCE`], valid for ten minutes,
    /// with no `permissions` claim.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        let mut claims = Map::new();
        claims.insert("sub".into(), json!("auth0|casting-tester"));
        claims.insert("iss".into(), json!(format!("https://{TEST_DOMAIN}/")));
        claims.insert("aud".into(), json!(TEST_AUDIENCE));
        claims.insert("iat".into(), json!(now));
        claims.insert("exp".into(), json!(now + 600));
        Self {
            kid: Some(test_keys().kid.clone()),
            claims,
        }
    }

    pub fn permissions(self, permissions: &[&str]) -> Self {
        self.claim("permissions", json!(permissions))
    }

    /// Set `exp` relative to now; negative values produce an expired token.
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = Utc::now().timestamp() + seconds;
        self.claim("exp", json!(exp))
    }

    pub fn kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_owned);
        self
    }

    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn sign(&self) -> String {
        self.sign_with(test_keys())
    }

    pub fn sign_with(&self, keys: &TestKeys) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid.clone();
        encode(&header, &self.claims, &keys.encoding).expect("sign token")
    }
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
