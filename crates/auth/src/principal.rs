use crate::{JwtClaims, Role};

/// Authenticated identity of a request, derived from verified claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: Option<String>,
    pub authorities: Vec<Role>,
}

impl Principal {
    pub fn new(subject: Option<String>, authorities: Vec<Role>) -> Self {
        Self {
            subject,
            authorities,
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self::new(claims.sub.clone(), claims.authorities())
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.authorities.iter().any(|a| roles.contains(a))
    }
}
