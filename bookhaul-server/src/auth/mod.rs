//! Authentication and authorization
//!
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - authenticated caller context
//! - [`require_auth`] - bearer-token middleware for non-public routes
//! - [`require_admin`] - admin-only route layer

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{authenticate, is_public_route, require_admin, require_auth};
