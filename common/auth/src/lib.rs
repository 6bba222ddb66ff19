pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod jwks;
pub mod permissions;
pub mod verifier;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use claims::Claims;
pub use config::{parse_algorithms, ExtractionMode, JwtConfig};
pub use error::{AuthError, AuthResult, ConfigError, ErrorBody};
pub use extractors::bearer_token;
pub use guards::{authorize, Authorized};
pub use jwks::{JsonWebKey, JwksFetcher, KeySet};
pub use permissions::{check_permissions, Permission};
pub use verifier::{JwtVerifier, JwtVerifierBuilder, KeySetCache};
