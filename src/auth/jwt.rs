use std::time::Duration;

use axum::http::HeaderValue;
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::config::JwtConfig;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a presented credential was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("authorization header required")]
    MissingCredential,
    #[error("invalid authorization format")]
    MalformedCredential,
    #[error("invalid token")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid token claims")]
    MalformedClaims,
}

/// HS256 signing and verification keys with the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(
            cfg.secret.as_bytes(),
            Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        )
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user_id: i64, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Verify signature and algorithm, decode the claims, then check expiry
    /// against `now`. A token is live while `now < exp`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::InvalidSignature)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::InvalidSignature);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        // `sub` is numeric; serde enforces its presence and type.
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::Json(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => TokenError::MalformedClaims,
                _ => TokenError::InvalidSignature,
            }
        })?;

        if now.unix_timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, TokenError> {
    let raw = match header {
        None => return Err(TokenError::MissingCredential),
        Some(v) if v.is_empty() => return Err(TokenError::MissingCredential),
        Some(v) => v.to_str().map_err(|_| TokenError::MalformedCredential)?,
    };

    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::MalformedCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(secret.as_bytes(), DAY)
    }

    #[test]
    fn sign_and_verify_token() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(17).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 17);
        assert_eq!(claims.exp - claims.iat, DAY.as_secs() as i64);
    }

    #[test]
    fn issued_token_passes_claim_checks() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(1).unwrap();
        assert_eq!(keys.verify(&token).map(|c| c.sub), Ok(1));
    }

    #[test]
    fn token_lives_for_exactly_the_ttl() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = keys.issue_at(5, issued).unwrap();

        assert!(keys.verify_at(&token, issued).is_ok());
        let last_second = issued + TimeDuration::seconds(DAY.as_secs() as i64 - 1);
        assert!(keys.verify_at(&token, last_second).is_ok());

        let expiry = issued + TimeDuration::seconds(DAY.as_secs() as i64);
        assert_eq!(keys.verify_at(&token, expiry), Err(TokenError::Expired));
        let later = expiry + TimeDuration::days(3);
        assert_eq!(keys.verify_at(&token, later), Err(TokenError::Expired));
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = make_keys("secret-a").issue(1).unwrap();
        let err = make_keys("secret-b").verify(&token).unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn verify_rejects_other_hmac_sizes() {
        let keys = make_keys("shared");
        let claims = Claims {
            sub: 1,
            iat: 0,
            exp: i64::MAX / 2,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"shared"),
        )
        .unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn verify_rejects_unsigned_tokens() {
        // {"alg":"none","typ":"JWT"} . {"sub":1,"iat":0,"exp":9999999999} . <empty>
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOjEsImlhdCI6MCwiZXhwIjo5OTk5OTk5OTk5fQ.";
        assert_eq!(
            make_keys("x").verify(token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_garbage() {
        assert_eq!(
            make_keys("x").verify("not-a-jwt"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let secret = EncodingKey::from_secret(b"k");
        let token = encode(
            &Header::new(ALGORITHM),
            &json!({"sub": "abc", "iat": 0, "exp": 9_999_999_999i64}),
            &secret,
        )
        .unwrap();
        assert_eq!(make_keys("k").verify(&token), Err(TokenError::MalformedClaims));
    }

    #[test]
    fn missing_subject_is_malformed() {
        let token = encode(
            &Header::new(ALGORITHM),
            &json!({"iat": 0, "exp": 9_999_999_999i64}),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        assert_eq!(make_keys("k").verify(&token), Err(TokenError::MalformedClaims));
    }

    #[test]
    fn bearer_header_parsing() {
        let hv = |s: &'static str| HeaderValue::from_static(s);

        assert_eq!(bearer_token(None), Err(TokenError::MissingCredential));
        assert_eq!(
            bearer_token(Some(&hv(""))),
            Err(TokenError::MissingCredential)
        );
        assert_eq!(bearer_token(Some(&hv("Bearer abc"))), Ok("abc"));
        for bad in ["abc", "Bearer", "Bearer ", "bearer abc", "Basic abc", "Bearer a b"] {
            assert_eq!(
                bearer_token(Some(&hv(bad))),
                Err(TokenError::MalformedCredential),
                "{bad:?}"
            );
        }
    }
}
