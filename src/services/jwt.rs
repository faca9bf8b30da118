// src/services/jwt.rs
// DOCUMENTATION: JWT issue and verification
// PURPOSE: HS256 access/refresh token pairs signed with separate secrets

use crate::config::Config;
use crate::errors::DirectoryError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub email: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    pub exp: i64,
    /// Unique token ID so two tokens issued in the same second differ
    pub jti: String,
    pub typ: TokenType,
}

/// Freshly issued token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Token service shared through web::Data
pub struct JwtService {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: &Config) -> Self {
        Self::from_secrets(
            &config.jwt_secret,
            &config.jwt_refresh_secret,
            config.jwt_access_ttl_secs,
            config.jwt_refresh_ttl_secs,
        )
    }

    pub fn from_secrets(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            access: SigningKeys::from_secret(access_secret),
            refresh: SigningKeys::from_secret(refresh_secret),
            access_ttl_secs,
            refresh_ttl_secs,
            validation,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    fn keys(&self, typ: TokenType) -> &SigningKeys {
        match typ {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    /// Sign a single token of the given type
    pub fn issue(&self, user_id: Uuid, email: &str, typ: TokenType) -> Result<String, DirectoryError> {
        let now = Utc::now().timestamp();
        let ttl = match typ {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now,
            exp: now + ttl,
            jti: Uuid::new_v4().to_string(),
            typ,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys(typ).encoding).map_err(|e| {
            log::error!("Failed to sign {:?} token: {}", typ, e);
            DirectoryError::InternalError("Failed to sign token".to_string())
        })
    }

    pub fn issue_pair(&self, user_id: Uuid, email: &str) -> Result<TokenPair, DirectoryError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, email, TokenType::Access)?,
            refresh_token: self.issue(user_id, email, TokenType::Refresh)?,
            expires_in: self.access_ttl_secs,
        })
    }

    /// Verify signature, expiry and token type
    pub fn verify(&self, token: &str, typ: TokenType) -> Result<Claims, DirectoryError> {
        let data = decode::<Claims>(token, &self.keys(typ).decoding, &self.validation).map_err(|e| {
            log::debug!("Rejected {:?} token: {}", typ, e);
            DirectoryError::Unauthorized("Invalid or expired token".to_string())
        })?;

        if data.claims.typ != typ {
            return Err(DirectoryError::Unauthorized("Invalid token type".to_string()));
        }
        Ok(data.claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, DirectoryError> {
        self.verify(token, TokenType::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, DirectoryError> {
        self.verify(token, TokenType::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::from_secrets("access-secret", "refresh-secret", 900, 604800)
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let jwt = service();
        let user_id = Uuid::new_v4();
        let pair = jwt.issue_pair(user_id, "minji@koreabiz.test").unwrap();

        let access = jwt.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, user_id);
        assert_eq!(access.typ, TokenType::Access);
        assert_eq!(access.exp - access.iat, 900);

        let refresh = jwt.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.typ, TokenType::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 604800);
        assert_ne!(access.jti, refresh.jti);
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt = service();
        let pair = jwt.issue_pair(Uuid::new_v4(), "a@b.test").unwrap();

        assert!(matches!(
            jwt.verify_refresh(&pair.access_token),
            Err(DirectoryError::Unauthorized(_))
        ));
        assert!(jwt.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_expired_and_foreign_tokens_rejected() {
        let jwt = service();
        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: Uuid::new_v4(),
            email: "old@koreabiz.test".to_string(),
            iat: now - 2000,
            exp: now - 1000,
            jti: Uuid::new_v4().to_string(),
            typ: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();
        assert!(jwt.verify_access(&token).is_err());

        let other = JwtService::from_secrets("other-secret", "other-refresh", 900, 900);
        let foreign = other.issue(Uuid::new_v4(), "x@y.test", TokenType::Access).unwrap();
        assert!(jwt.verify_access(&foreign).is_err());
        assert!(jwt.verify_access("not-a-jwt").is_err());
    }
}
