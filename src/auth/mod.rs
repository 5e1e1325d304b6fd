//! Telegram WebApp `initData` validation.
//!
//! The identity provider hands the client a signed query string; we verify
//! the signature server-side before trusting the embedded user claims.
//! The verification scheme is HMAC-SHA256 over the sorted key=value lines
//! (excluding `hash`), keyed with HMAC-SHA256("WebAppData", bot_token).

use crate::domain::{PlayerId, PlayerProfile};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// User claims embedded in a validated `initData` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl TelegramUser {
    pub fn player_id(&self) -> PlayerId {
        PlayerId::new(self.id.to_string())
    }

    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            language_code: self.language_code.clone(),
            photo_url: self.photo_url.clone(),
            is_premium: self.is_premium,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("initData is missing the hash field")]
    MissingHash,
    #[error("initData is missing the user field")]
    MissingUser,
    #[error("initData signature verification failed")]
    BadSignature,
    #[error("initData user payload is malformed: {0}")]
    Malformed(String),
}

/// Validates an externally issued session token and extracts the identity.
#[async_trait]
pub trait InitDataValidator: Send + Sync {
    async fn validate(&self, init_data: &str) -> Result<TelegramUser, AuthError>;
}

/// Production validator keyed with the bot token.
pub struct BotTokenValidator {
    secret_key: [u8; 32],
}

impl BotTokenValidator {
    pub fn new(bot_token: &str) -> Self {
        // Per the scheme, the signing key is derived once from the token.
        let mut mac = HmacSha256::new_from_slice(b"WebAppData")
            .expect("HMAC accepts keys of any length");
        mac.update(bot_token.as_bytes());
        BotTokenValidator {
            secret_key: mac.finalize().into_bytes().into(),
        }
    }

    fn verify(&self, init_data: &str) -> Result<TelegramUser, AuthError> {
        let (check_string, hash, user_json) = split_init_data(init_data)?;

        let signature = hex::decode(&hash).map_err(|_| AuthError::BadSignature)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret_key)
            .expect("HMAC accepts keys of any length");
        mac.update(check_string.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        parse_user(&user_json)
    }
}

#[async_trait]
impl InitDataValidator for BotTokenValidator {
    async fn validate(&self, init_data: &str) -> Result<TelegramUser, AuthError> {
        self.verify(init_data)
    }
}

/// Test validator: extracts the user claims without checking the signature.
pub struct MockInitDataValidator;

#[async_trait]
impl InitDataValidator for MockInitDataValidator {
    async fn validate(&self, init_data: &str) -> Result<TelegramUser, AuthError> {
        let mut user_json = None;
        for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
            if key == "user" {
                user_json = Some(value.into_owned());
            }
        }
        parse_user(&user_json.ok_or(AuthError::MissingUser)?)
    }
}

/// Decode the query string into (sorted data-check string, hash, user JSON).
fn split_init_data(init_data: &str) -> Result<(String, String, String), AuthError> {
    let mut hash = None;
    let mut user_json = None;
    let mut lines = Vec::new();

    for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
        if key == "hash" {
            hash = Some(value.into_owned());
            continue;
        }
        if key == "user" {
            user_json = Some(value.clone().into_owned());
        }
        lines.push(format!("{}={}", key, value));
    }

    let hash = hash.ok_or(AuthError::MissingHash)?;
    let user_json = user_json.ok_or(AuthError::MissingUser)?;
    lines.sort();

    Ok((lines.join("\n"), hash, user_json))
}

fn parse_user(user_json: &str) -> Result<TelegramUser, AuthError> {
    serde_json::from_str(user_json).map_err(|e| AuthError::Malformed(e.to_string()))
}
