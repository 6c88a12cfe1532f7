use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Granted authority, always in `ROLE_<NAME>` form.
///
/// Token role claims are free-form; any claim value maps to exactly one
/// authority, recognized by the access rules or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const USER: Role = Role(Cow::Borrowed("ROLE_USER"));
    pub const ADMIN: Role = Role(Cow::Borrowed("ROLE_ADMIN"));

    pub const PREFIX: &'static str = "ROLE_";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Authority for a raw role claim value: `"admin"` becomes `ROLE_ADMIN`.
    pub fn from_claim(claim: &str) -> Self {
        Self(Cow::Owned(format!("{}{}", Self::PREFIX, claim.trim().to_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
