//! `tutoria-auth` — role model and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It only
//! consumes a user's granted role set; it never derives one from credentials.

pub mod authorize;
pub mod granted;
pub mod roles;

pub use authorize::{require_role, AuthzError, Principal};
pub use granted::GrantedRoleSet;
pub use roles::{BadgeTone, Role, RoleParseError, RoleStyle};
