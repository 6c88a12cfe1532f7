use eggs_auth::Principal;

/// Principal context for a request (authenticated identity + authorities).
///
/// Only present on requests that carried a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn subject(&self) -> Option<&str> {
        self.principal.subject.as_deref()
    }
}
