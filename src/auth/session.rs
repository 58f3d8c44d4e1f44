use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::{Identity, SessionClaims};
use crate::config::SessionConfig;

/// Outcome of looking at the session cookie of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    Valid(Identity),
    Missing,
    /// Present but failed signature, expiry, issuer or audience checks.
    Rejected,
}

impl TokenCheck {
    pub fn identity(self) -> Option<Identity> {
        match self {
            TokenCheck::Valid(identity) => Some(identity),
            TokenCheck::Missing | TokenCheck::Rejected => None,
        }
    }
}

/// Signs and verifies the stateless session token.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    cookie_name: String,
    cookie_secure: bool,
}

impl SessionKeys {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.max_age_secs().max(0) as u64),
            cookie_name: cfg.cookie_name.clone(),
            cookie_secure: cfg.cookie_secure,
        }
    }

    pub fn issue(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = i64::try_from(self.ttl.as_secs()).context("session ttl out of range")?;
        let exp = now
            .checked_add(TimeDuration::seconds(ttl))
            .context("session expiry out of range")?;
        let claims = SessionClaims {
            sub: identity.id,
            email: identity.email.clone(),
            nome: identity.nome.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %identity.id, "session token issued");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Identity> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims.into())
    }

    /// Never errors: anything wrong with the token is `Rejected`.
    pub fn check(&self, headers: &HeaderMap) -> TokenCheck {
        let Some(token) = cookie_value(headers, &self.cookie_name) else {
            return TokenCheck::Missing;
        };
        match self.verify(token) {
            Ok(identity) => TokenCheck::Valid(identity),
            Err(e) => {
                debug!(error = %e, "session token rejected");
                TokenCheck::Rejected
            }
        }
    }

    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            self.cookie_name,
            token,
            self.ttl.as_secs(),
            if self.cookie_secure { "; Secure" } else { "" }
        )
    }

    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.cookie_name,
            if self.cookie_secure { "; Secure" } else { "" }
        )
    }
}

/// Value of cookie `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}
