//! Bearer token issuance and verification.
//!
//! Tokens are HS256-signed JWTs. Signature, algorithm, audience and issuer
//! are checked by `jsonwebtoken`; the validity window (`nbf`/`exp`) is checked
//! against the injected clock so expiry can be tested deterministically.
//! Every verification failure reaches the caller as the same `UNAUTHORIZED`
//! error; the specific cause is only logged.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use common::{ApiResult, ErrorCode, JwtConfig};
use domain::{MAX_TOKEN_LIFETIME_HOURS, TOKEN_AUDIENCE, TOKEN_ISSUER};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_asset_id: Option<Uuid>,
    pub iss: String,
    pub sub: String,
    pub aud: Vec<String>,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies bearer tokens.
///
/// Keys are derived once at construction and never change afterwards.
#[derive(Clone)]
pub struct TokenService {
    keys: Option<Arc<Keys>>,
    lifetime: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TokenService {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let keys = config.secret.as_deref().map(|secret| {
            Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            })
        });

        Self {
            keys,
            lifetime: Duration::try_hours(config.expiration_hours)
                .unwrap_or_else(|| Duration::hours(MAX_TOKEN_LIFETIME_HOURS)),
            clock,
        }
    }

    /// Sign a token for the given identity.
    ///
    /// Fails with `ENVIRONMENT_VARIABLE_NOT_FOUND` when no secret is configured.
    pub fn issue(
        &self,
        username: &str,
        id: Uuid,
        profile_picture_asset_id: Option<Uuid>,
    ) -> ApiResult<String> {
        let keys = self.keys.as_ref().ok_or_else(|| {
            ErrorCode::EnvironmentVariableNotFound.with_detail("JWT_SECRET_KEY is not set")
        })?;

        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| ErrorCode::InternalServer.with_detail("Token expiry is out of range"))?;
        let claims = Claims {
            username: username.to_string(),
            id,
            profile_picture_asset_id,
            iss: TOKEN_ISSUER.to_string(),
            sub: username.to_string(),
            aud: vec![TOKEN_AUDIENCE.to_string()],
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &keys.encoding).map_err(|e| {
            ErrorCode::InternalServer
                .with_detail("Failed to sign token")
                .with_cause(e)
        })
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let keys = self.keys.as_ref().ok_or_else(|| {
            ErrorCode::InternalServer.with_detail("Token verification is not configured")
        })?;

        if token.trim().is_empty() {
            return Err(rejected("empty token"));
        }

        let claims = decode::<Claims>(token, &keys.decoding, &validation())
            .map_err(|e| rejected(&e.to_string()))?
            .claims;

        let now = self.clock.utc().timestamp();
        if now > claims.exp {
            return Err(rejected("token expired"));
        }
        if now < claims.nbf {
            return Err(rejected("token not yet valid"));
        }

        Ok(claims)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "nbf", "aud", "iss", "sub"]);
    // Checked against the injected clock instead
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation
}

fn rejected(reason: &str) -> common::ClassifiedError {
    debug!(reason, "token verification failed");
    ErrorCode::Unauthorized.error()
}
