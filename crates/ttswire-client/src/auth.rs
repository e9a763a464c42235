use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ClientError, Result};

type HmacSha256 = Hmac<Sha256>;

/// How the `Authorization` header is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Bearer <token>`
    BearerSpace,
    /// `Bearer;<token>`, used by several providers sharing this transport.
    #[default]
    BearerSemicolon,
    /// `Signature <hex hmac>;t=<unix seconds>;appid=<app id>`
    HmacSha256,
}

impl AuthScheme {
    pub fn name(self) -> &'static str {
        match self {
            AuthScheme::BearerSpace => "bearer_space",
            AuthScheme::BearerSemicolon => "bearer_semicolon",
            AuthScheme::HmacSha256 => "hmac_sha256",
        }
    }
}

/// Credentials for one connection.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub scheme: AuthScheme,
    pub app_id: String,
    /// Treated as opaque credential material and redacted in debug output.
    pub access_token: String,
    /// Required by [`AuthScheme::HmacSha256`] only.
    pub secret_key: Option<String>,
}

impl AuthConfig {
    pub fn new(app_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: AuthScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("AuthConfig");
        dbg.field("scheme", &self.scheme)
            .field("app_id", &self.app_id)
            .field(
                "access_token",
                &format_args!("<redacted:{} bytes>", self.access_token.len()),
            );
        if let Some(secret) = &self.secret_key {
            dbg.field(
                "secret_key",
                &format_args!("<redacted:{} bytes>", secret.len()),
            );
        } else {
            dbg.field("secret_key", &Option::<String>::None);
        }
        dbg.finish()
    }
}

/// Strip surrounding whitespace and one layer of quote characters.
pub fn clean_token(token: &str) -> &str {
    let token = token.trim();
    let token = token.strip_prefix(['"', '\'']).unwrap_or(token);
    token.strip_suffix(['"', '\'']).unwrap_or(token)
}

/// Build the `Authorization` header value using the current time.
pub fn authorization_header(auth: &AuthConfig) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    authorization_header_at(auth, timestamp)
}

/// Build the `Authorization` header value for a fixed unix timestamp.
pub fn authorization_header_at(auth: &AuthConfig, timestamp: u64) -> Result<String> {
    let token = clean_token(&auth.access_token);
    match auth.scheme {
        AuthScheme::BearerSpace => Ok(format!("Bearer {token}")),
        AuthScheme::BearerSemicolon => Ok(format!("Bearer;{token}")),
        AuthScheme::HmacSha256 => {
            let secret = auth
                .secret_key
                .as_deref()
                .filter(|secret| !secret.is_empty())
                .ok_or(ClientError::MissingSecretKey)?;
            let canonical = format!("{}{token}{timestamp}", auth.app_id);
            let signature = sign(secret, &canonical)?;
            Ok(format!(
                "Signature {signature};t={timestamp};appid={}",
                auth.app_id
            ))
        }
    }
}

fn sign(secret: &str, canonical: &str) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ClientError::MissingSecretKey)?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
