use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AuthError, AuthResult};

/// Application-focused representation of verified JWT claims.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    pub subject: Option<String>,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    /// `None` when the token carries no permission scoping at all.
    pub permissions: Option<Vec<String>>,
    pub raw: Value,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.iter().any(|value| value == permission))
    }
}

impl TryFrom<Value> for Claims {
    type Error = AuthError;

    /// Project an already validated payload onto the typed fields.
    ///
    /// Only a missing or non-numeric `exp` fails. Other claims the signature
    /// check does not constrain are read leniently: values of an unexpected
    /// type become `None`, and `raw` always keeps the full payload.
    fn try_from(value: Value) -> AuthResult<Self> {
        let exp = value
            .get("exp")
            .and_then(seconds)
            .ok_or_else(|| AuthError::InvalidToken("exp claim missing or not numeric".into()))?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let issued_at = value
            .get("iat")
            .and_then(seconds)
            .and_then(|iat| Utc.timestamp_opt(iat, 0).single());

        let audience = match value.get("aud") {
            Some(Value::String(item)) => vec![item.clone()],
            Some(Value::Array(items)) => strings(items),
            _ => Vec::new(),
        };

        Ok(Self {
            subject: string_claim(&value, "sub"),
            issuer: string_claim(&value, "iss").unwrap_or_default(),
            audience,
            expires_at,
            issued_at,
            permissions: permissions_from(&value),
            raw: value,
        })
    }
}

// NumericDate allows fractional seconds; the fraction is dropped.
fn seconds(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.is_finite())
            .map(|secs| secs.trunc() as i64)
    })
}

fn string_claim(raw: &Value, name: &str) -> Option<String> {
    raw.get(name).and_then(Value::as_str).map(str::to_owned)
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

// Any array counts as a permission list; non-string entries grant nothing.
// A claim that is absent or not an array is no list at all.
fn permissions_from(raw: &Value) -> Option<Vec<String>> {
    raw.get("permissions")?.as_array().map(|items| strings(items))
}
