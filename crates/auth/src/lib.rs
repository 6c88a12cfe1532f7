//! `eggs-auth`: pure authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: requests are described by a
//! method string and a path, identities by a [`Principal`].

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use authorize::{AccessPolicy, AccessRule, AuthzError, MethodMatch, PathPattern, Requirement};
pub use claims::{JwtClaims, TokenValidationError, authorities_from_role_claim};
pub use jwt::{Hs256JwtValidator, JwtValidator, validation_for};
pub use principal::Principal;
pub use roles::Role;
