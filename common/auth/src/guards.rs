use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use tracing::debug;

use crate::claims::Claims;
use crate::error::AuthResult;
use crate::extractors::bearer_token;
use crate::permissions::{check_permissions, Permission};
use crate::verifier::JwtVerifier;

/// Run the full authorization pipeline for one request: extract the bearer
/// token, verify it, then require `permission`. The first failure is returned
/// unchanged.
pub async fn authorize(
    verifier: &JwtVerifier,
    headers: &HeaderMap,
    permission: &str,
) -> AuthResult<Claims> {
    let token = bearer_token(headers, verifier.config().extraction_mode)?;
    let claims = verifier.verify(&token).await?;
    check_permissions(permission, &claims)?;
    Ok(claims)
}

/// Verified claims for a request that holds permission `P`.
///
/// Taking `Authorized<P>` as the first handler argument gates the handler:
/// it only runs once the token is verified and grants `P::NAME`; otherwise the
/// [`AuthError`](crate::AuthError) becomes the response.
#[derive(Debug, Clone)]
pub struct Authorized<P> {
    pub claims: Claims,
    _permission: PhantomData<fn() -> P>,
}

impl<P: Permission> Authorized<P> {
    pub fn permission(&self) -> &'static str {
        P::NAME
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Authorized<P>
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
    P: Permission,
{
    type Rejection = crate::error::AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<JwtVerifier>::from_ref(state);
        let claims = authorize(&verifier, &parts.headers, P::NAME)
            .await
            .inspect_err(|err| {
                debug!(
                    permission = P::NAME,
                    path = %parts.uri.path(),
                    code = err.code(),
                    status = err.status().as_u16(),
                    "authorization denied"
                )
            })?;

        Ok(Self {
            claims,
            _permission: PhantomData,
        })
    }
}
