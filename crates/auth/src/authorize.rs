//! Request authorization: an ordered rule table over method + path.
//!
//! - No IO
//! - No panics
//! - First matching rule wins; the fallback applies when none match

use thiserror::Error;

use crate::{Principal, Role};

/// Path prefix of the record collection.
pub const RESOURCE_PREFIX: &str = "/egg-production";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: requires one of [{0}]")]
    Forbidden(String),
}

/// Path matcher in the style of `/prefix/**`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    Any,
    Exact(&'static str),
    /// The prefix itself and everything below it (`/a` matches `/a`, `/a/`, `/a/b/c`).
    Subtree(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match *self {
            PathPattern::Any => true,
            PathPattern::Exact(p) => path == p,
            PathPattern::Subtree(prefix) => match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodMatch {
    Any,
    OneOf(&'static [&'static str]),
}

impl MethodMatch {
    pub fn matches(&self, method: &str) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::OneOf(methods) => methods.iter().any(|m| m.eq_ignore_ascii_case(method)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Authenticated,
    AnyRole(Vec<Role>),
}

impl Requirement {
    /// Check `principal` (if any) against this requirement.
    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AuthzError> {
        match (self, principal) {
            (Requirement::PermitAll, _) => Ok(()),
            (_, None) => Err(AuthzError::Unauthenticated),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::AnyRole(roles), Some(p)) => {
                if p.has_any_role(roles) {
                    Ok(())
                } else {
                    let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                    Err(AuthzError::Forbidden(names.join(", ")))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub methods: MethodMatch,
    pub paths: Vec<PathPattern>,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn new(methods: MethodMatch, paths: Vec<PathPattern>, requirement: Requirement) -> Self {
        Self {
            methods,
            paths,
            requirement,
        }
    }

    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.methods.matches(method) && self.paths.iter().any(|p| p.matches(path))
    }
}

/// Ordered rule table plus the requirement used when no rule matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>, fallback: Requirement) -> Self {
        Self { rules, fallback }
    }

    /// Rules for the egg-production API:
    ///
    /// 1. `OPTIONS` anywhere: public (CORS preflight)
    /// 2. API documentation: public
    /// 3. `GET /egg-production/**`: USER or ADMIN
    /// 4. `POST|PUT|DELETE /egg-production/**`: ADMIN
    /// 5. anything else: any authenticated identity
    pub fn egg_production() -> Self {
        let resource = PathPattern::Subtree(RESOURCE_PREFIX);

        Self::new(
            vec![
                AccessRule::new(
                    MethodMatch::OneOf(&["OPTIONS"]),
                    vec![PathPattern::Any],
                    Requirement::PermitAll,
                ),
                AccessRule::new(
                    MethodMatch::Any,
                    vec![
                        PathPattern::Exact("/swagger-ui.html"),
                        PathPattern::Subtree("/v3/api-docs"),
                        PathPattern::Subtree("/swagger-ui"),
                    ],
                    Requirement::PermitAll,
                ),
                AccessRule::new(
                    MethodMatch::OneOf(&["GET"]),
                    vec![resource],
                    Requirement::AnyRole(vec![Role::USER, Role::ADMIN]),
                ),
                AccessRule::new(
                    MethodMatch::OneOf(&["POST", "PUT", "DELETE"]),
                    vec![resource],
                    Requirement::AnyRole(vec![Role::ADMIN]),
                ),
            ],
            Requirement::Authenticated,
        )
    }

    pub fn requirement(&self, method: &str, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|r| r.matches(method, path))
            .map(|r| &r.requirement)
            .unwrap_or(&self.fallback)
    }

    pub fn authorize(
        &self,
        method: &str,
        path: &str,
        principal: Option<&Principal>,
    ) -> Result<(), AuthzError> {
        self.requirement(method, path).check(principal)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::egg_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Option<&str>) -> Principal {
        Principal::new(
            Some("tester".to_string()),
            crate::authorities_from_role_claim(role),
        )
    }

    #[test]
    fn subtree_pattern_matches_prefix_and_children_only() {
        let p = PathPattern::Subtree("/egg-production");
        assert!(p.matches("/egg-production"));
        assert!(p.matches("/egg-production/"));
        assert!(p.matches("/egg-production/activate/3"));
        assert!(!p.matches("/egg-productionx"));
        assert!(!p.matches("/other"));
    }

    #[test]
    fn user_may_read_but_not_write() {
        let policy = AccessPolicy::egg_production();
        let user = principal(Some("User"));

        assert_eq!(policy.authorize("GET", "/egg-production/1", Some(&user)), Ok(()));
        assert!(matches!(
            policy.authorize("POST", "/egg-production", Some(&user)),
            Err(AuthzError::Forbidden(_))
        ));
        assert!(matches!(
            policy.authorize("PUT", "/egg-production/activate/1", Some(&user)),
            Err(AuthzError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_may_read_and_write() {
        let policy = AccessPolicy::egg_production();
        let admin = principal(Some("Admin"));

        for method in ["GET", "POST", "PUT", "DELETE"] {
            assert_eq!(policy.authorize(method, "/egg-production", Some(&admin)), Ok(()));
        }
    }

    #[test]
    fn identity_without_role_is_forbidden_on_resource() {
        let policy = AccessPolicy::egg_production();
        let nobody = principal(None);

        assert!(matches!(
            policy.authorize("GET", "/egg-production", Some(&nobody)),
            Err(AuthzError::Forbidden(_))
        ));
        // ...but passes the catch-all rule.
        assert_eq!(policy.authorize("GET", "/anything", Some(&nobody)), Ok(()));
    }

    #[test]
    fn unrecognized_role_is_forbidden_on_resource() {
        let policy = AccessPolicy::egg_production();
        let guest = principal(Some("guest"));

        assert!(matches!(
            policy.authorize("GET", "/egg-production", Some(&guest)),
            Err(AuthzError::Forbidden(_))
        ));
    }

    #[test]
    fn preflight_and_docs_are_public() {
        let policy = AccessPolicy::egg_production();

        assert_eq!(policy.authorize("OPTIONS", "/egg-production/1", None), Ok(()));
        assert_eq!(policy.authorize("GET", "/v3/api-docs", None), Ok(()));
        assert_eq!(policy.authorize("GET", "/v3/api-docs/swagger-config", None), Ok(()));
        assert_eq!(policy.authorize("GET", "/swagger-ui/index.html", None), Ok(()));
        assert_eq!(policy.authorize("GET", "/swagger-ui.html", None), Ok(()));
    }

    #[test]
    fn anonymous_requests_need_authentication() {
        let policy = AccessPolicy::egg_production();

        assert_eq!(
            policy.authorize("GET", "/egg-production", None),
            Err(AuthzError::Unauthenticated)
        );
        assert_eq!(
            policy.authorize("GET", "/whatever", None),
            Err(AuthzError::Unauthenticated)
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = AccessPolicy::egg_production();
        // OPTIONS on the resource hits rule 1 before the role rules.
        assert_eq!(
            policy.requirement("OPTIONS", "/egg-production"),
            &Requirement::PermitAll
        );
        assert_eq!(
            policy.requirement("PATCH", "/egg-production/1"),
            &Requirement::Authenticated
        );
    }
}
