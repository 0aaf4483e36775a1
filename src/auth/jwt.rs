use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, messages};

/// Bearer token payload: just the user id plus the standard time claims.
/// Stateless: validity is signature + expiry, nothing is persisted and
/// nothing is cross-checked against the rotating guest token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i32,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }

    /// Reads the HS256 secret from the configured key file. Called once
    /// at startup; a missing or unreadable file is fatal.
    pub fn from_secret_file(path: &str) -> anyhow::Result<Self> {
        let secret = std::fs::read(path)
            .map_err(|err| anyhow::anyhow!("cannot read jwt secret file {path}: {err}"))?;
        Ok(Self::from_secret(&secret))
    }
}

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn make_claims(user_id: i32, ttl_secs: usize) -> Claims {
    let iat = now_unix();
    Claims {
        id: user_id,
        iat,
        exp: iat + ttl_secs,
    }
}

pub fn encode_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &keys.enc).map_err(|err| {
        tracing::error!(error = %err, "token encoding failed");
        AppError::persistence("token_error", messages::PERSISTENCE)
    })
}

pub fn decode_token(keys: &JwtKeys, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &keys.dec, &validation)?;
    Ok(data.claims)
}
