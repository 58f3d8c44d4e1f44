use anyhow::Context;

/// Session signing and cookie settings. Shared by the route guard, the
/// session issuer and the login handler so there is only one lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub max_age_days: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub app_env: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = resolve_secret(
            std::env::var("AUTH_SECRET").ok(),
            std::env::var("NEXTAUTH_SECRET").ok(),
        )
        .context("AUTH_SECRET (or NEXTAUTH_SECRET) is not set")?;

        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "cadastro-aco".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "cadastro-aco-users".into()),
            max_age_days: parse_max_age_days(std::env::var("SESSION_MAX_AGE_DAYS").ok())
                .context("SESSION_MAX_AGE_DAYS is out of range")?,
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "cadastro_session".into()),
            cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        };

        Ok(Self {
            database_url,
            session,
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        })
    }
}

pub const DEFAULT_SESSION_DAYS: i64 = 30;
pub const MAX_SESSION_DAYS: i64 = 3650;

impl SessionConfig {
    /// Clamped to `0..=MAX_SESSION_DAYS` days.
    pub fn max_age_secs(&self) -> i64 {
        self.max_age_days.clamp(0, MAX_SESSION_DAYS) * 24 * 60 * 60
    }
}

/// Unset, unparsable or non-positive values fall back to the default.
fn parse_max_age_days(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(days) = raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|d| *d > 0) else {
        return Ok(DEFAULT_SESSION_DAYS);
    };
    anyhow::ensure!(
        days <= MAX_SESSION_DAYS,
        "session lifetime of {days} days exceeds {MAX_SESSION_DAYS}"
    );
    Ok(days)
}

/// `AUTH_SECRET` wins; `NEXTAUTH_SECRET` is still accepted for older deployments.
fn resolve_secret(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.trim().is_empty())
        .or_else(|| legacy.filter(|s| !s.trim().is_empty()))
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
