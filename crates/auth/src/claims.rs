use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// JWT claims this service reads from a verified token.
///
/// Only `role` drives authorization. Registered claims (`exp`, `iat`, `aud`)
/// are enforced by the validator while decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Single role name, e.g. `"ADMIN"`. Scalars other than strings are
    /// accepted and stringified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl JwtClaims {
    /// The `role` claim as a string, if it is a scalar.
    pub fn role_claim(&self) -> Option<String> {
        match self.role.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn authorities(&self) -> Vec<Role> {
        authorities_from_role_claim(self.role_claim().as_deref())
    }
}

/// Map a role claim to the authorities it grants.
///
/// One claim yields one authority; no claim (or a blank one) yields none,
/// which still counts as authenticated.
pub fn authorities_from_role_claim(claim: Option<&str>) -> Vec<Role> {
    match claim {
        Some(role) if !role.trim().is_empty() => vec![Role::from_claim(role)],
        _ => Vec::new(),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("no signing key matches kid '{0}'")]
    UnknownKey(String),

    #[error("signing keys unavailable: {0}")]
    KeySource(String),

    #[error("token rejected: {0}")]
    Rejected(String),
}

impl From<jsonwebtoken::errors::Error> for TokenValidationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::Malformed(err.to_string()),
            _ => Self::Rejected(err.to_string()),
        }
    }
}
