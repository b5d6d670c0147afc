//! JWT Verifier
//!
//! HS256 签名；`exp` 校验不留宽限时间

use chrono::Utc;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::application::ports::{Claims, TokenVerifierPort};
use crate::application::AuthFailure;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 签发与校验
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
}

impl JwtVerifier {
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs: i64::try_from(expiry_secs).unwrap_or(i64::MAX),
        }
    }

    /// 为用户签发 Token，有效期为配置的 `token_expiry_secs`
    pub fn issue_token(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        self.encode_claims(&Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.expiry_secs),
        })
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header {
            alg: ALGORITHM,
            ..Default::default()
        };
        encode(&header, claims, &self.encoding_key)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthFailure> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                _ => {
                    tracing::debug!(error.msg = %e, "Failed to decode token");
                    AuthFailure::Invalid
                }
            })
    }
}

impl TokenVerifierPort for JwtVerifier {
    fn verify(&self, headers: &HeaderMap) -> Result<Claims, AuthFailure> {
        let token = extract_bearer(headers).ok_or(AuthFailure::Missing)?;
        self.decode_token(token)
    }
}

/// 从 `Authorization: Bearer <token>` 中取出 Token
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
