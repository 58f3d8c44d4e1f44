use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a request belongs to. No password material ever ends up in here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
}

/// JWT payload carried by the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,      // user ID
    pub email: String,
    pub nome: String,
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

impl From<SessionClaims> for Identity {
    fn from(c: SessionClaims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            nome: c.nome,
        }
    }
}
