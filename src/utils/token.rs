use axum::http::StatusCode;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorMessage, HttpError};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issues a token for `user_id`. Sessions are minted by the identity
/// service; this side only needs it to build fixtures.
#[cfg(test)]
pub fn create_token(
    user_id: &str,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    use jsonwebtoken::{encode, errors::ErrorKind, EncodingKey, Header};

    if user_id.is_empty() {
        return Err(ErrorKind::InvalidSubject.into());
    }

    let now = chrono::Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + chrono::Duration::seconds(expires_in_seconds)).timestamp() as usize;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat,
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Returns the subject (user id) of a valid HS256 token.
pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, HttpError> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    );

    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(HttpError::new(
            ErrorMessage::InvalidToken.to_string(),
            StatusCode::UNAUTHORIZED,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_subject() {
        let token = create_token("d2b7a9f0-5c1e-4c0a-9b61-0f0c2b9f4a11", b"secret", 60).unwrap();
        let sub = decode_token(token, b"secret").unwrap();
        assert_eq!(sub, "d2b7a9f0-5c1e-4c0a-9b61-0f0c2b9f4a11");
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let token = create_token("user", b"secret", 60).unwrap();
        assert!(decode_token(token, b"other").is_err());

        let expired = create_token("user", b"secret", -3600).unwrap();
        let error = decode_token(expired, b"secret").unwrap_err();
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn refuses_empty_subject() {
        assert!(create_token("", b"secret", 60).is_err());
    }
}
