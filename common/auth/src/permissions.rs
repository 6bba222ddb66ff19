use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};

/// A permission string an endpoint requires, as a type.
///
/// Handlers name their requirement through the type parameter of
/// [`Authorized`](crate::Authorized).
pub trait Permission: Send + Sync + 'static {
    const NAME: &'static str;
}

/// Declare unit types implementing [`Permission`].
///
/// ```ignore
/// common_auth::permissions! {
///     GetMovies => "get:movies",
///     PostMovies => "post:movies",
/// }
/// ```
#[macro_export]
macro_rules! permissions {
    ($($(#[$meta:meta])* $name:ident => $value:literal),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl $crate::Permission for $name {
                const NAME: &'static str = $value;
            }
        )+
    };
}

/// Confirm `required` is granted by the verified claims.
///
/// A token without a `permissions` claim is a different failure (400) from a
/// token whose list lacks the permission (403). Matching is exact and
/// case-sensitive.
pub fn check_permissions(required: &str, claims: &Claims) -> AuthResult<()> {
    let granted = claims
        .permissions
        .as_deref()
        .ok_or(AuthError::MissingPermissions)?;

    if granted.iter().any(|permission| permission == required) {
        Ok(())
    } else {
        Err(AuthError::PermissionNotFound(required.to_string()))
    }
}
