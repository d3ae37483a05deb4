//! HS256 session tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mindforge_core::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: Value,
    iat: i64,
    exp: i64,
}

/// Signing secret and token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in_secs: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expires_in_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_secs,
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expires_in_secs
    }

    /// Sign a token for `user_id`.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: Value::from(user_id),
            iat: now,
            exp: now + self.expires_in_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry, returning the user id.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| Error::Unauthorized(format!("invalid token: {e}")))?;

        user_id_claim(&data.claims.user_id)
            .ok_or_else(|| Error::Unauthorized("invalid user id in token".to_string()))
    }
}

/// Accept `userId` as a number, a numeric string, or an object wrapping one
/// of those under `userId`.
fn user_id_claim(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => match map.get("userId")? {
            Value::Object(_) => None,
            inner => user_id_claim(inner),
        },
        _ => None,
    }
}
