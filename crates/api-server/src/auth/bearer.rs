use axum::http::{header::AUTHORIZATION, HeaderMap};
use taskflow_core::session::Identity;

use super::TokenIssuer;

/// Identify the caller from an `Authorization: Bearer` header
pub fn resolve_identity(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<Identity, String> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?
        .to_str()
        .map_err(|_| "Malformed Authorization header".to_string())?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| "Expected a bearer token".to_string())?;

    tokens.verify(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;

    #[test]
    fn test_resolves_valid_bearer() {
        let tokens = TokenIssuer::new("secret", Duration::hours(1));
        let identity = Identity {
            uid: "u-1".to_string(),
            email: "a@example.com".to_string(),
        };
        let (token, _) = tokens.issue(&identity).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(resolve_identity(&headers, &tokens).unwrap(), identity);
    }

    #[test]
    fn test_rejects_missing_or_other_schemes() {
        let tokens = TokenIssuer::new("secret", Duration::hours(1));
        assert!(resolve_identity(&HeaderMap::new(), &tokens).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(resolve_identity(&headers, &tokens).is_err());
    }
}
