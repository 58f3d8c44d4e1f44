use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

use super::claims::Identity;
use crate::db::Repository;
use crate::error::AppError;

lazy_static! {
    /// Verified against when the email is unknown, so both rejections cost one argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("cadastro-aco-dummy-password").ok();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Constant-time comparison against a stored PHC string. A hash that does not
/// parse counts as a mismatch.
pub fn password_matches(plain: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Checks an email/password pair against the store.
///
/// Unknown email and wrong password both yield [`AppError::InvalidCredentials`],
/// so callers cannot tell which accounts exist. Missing input is rejected
/// before any lookup. Read-only.
pub async fn verify_credentials(
    repo: &dyn Repository,
    email: Option<&str>,
    senha: Option<&str>,
) -> Result<Identity, AppError> {
    let email = email.map(normalize_email).filter(|e| !e.is_empty());
    let senha = senha.filter(|s| !s.is_empty());
    let (Some(email), Some(senha)) = (email, senha) else {
        return Err(AppError::InvalidCredentials);
    };

    let Some(user) = repo.find_user_by_email(&email).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            password_matches(senha, dummy);
        }
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !password_matches(senha, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(Identity {
        id: user.id,
        email: user.email,
        nome: user.nome,
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
