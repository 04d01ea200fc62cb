use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskflow_core::session::Identity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// Signs and checks the bearer tokens handed out at login
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<(String, usize), String> {
        let exp = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| "Session token lifetime is out of range".to_string())?
            .timestamp() as usize;
        let claims = SessionClaims {
            sub: identity.uid.clone(),
            email: identity.email.clone(),
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map(|token| (token, exp))
            .map_err(|err| format!("Failed to sign session token: {}", err))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, String> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|decoded| Identity {
                uid: decoded.claims.sub,
                email: decoded.claims.email,
            })
            .map_err(|err| format!("Invalid session token: {}", err))
    }
}

pub fn format_expiry(exp: usize) -> String {
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .map(|value| value.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}
