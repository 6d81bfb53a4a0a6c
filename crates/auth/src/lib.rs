//! `wms-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns a
//! bearer token into a [`Principal`] and answers "may this principal do X".

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
