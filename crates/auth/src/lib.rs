//! `warden-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. The external
//! auth provider (sessions, memberships, built-in organization permissions)
//! is reached only through the narrow adapter traits defined here.

pub mod claims;
pub mod jwt;
pub mod member;
pub mod org_role;
pub mod principal;
pub mod provider;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use member::Member;
pub use org_role::OrgRole;
pub use principal::{PlatformRole, PrincipalId};
pub use provider::{BuiltinResource, MemberDirectory, OrgAccessControl, ProviderError};
