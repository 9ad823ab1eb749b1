//! Authentication module

mod context;
mod extractors;
pub mod jwt;
mod manager;
pub mod middleware;

pub use context::AuthContext;
pub use extractors::{AdminAuth, Auth, AuthRejection};
pub use jwt::SessionClaims;
pub use manager::AuthManager;
pub use middleware::{AuthError, AuthState, check_origin, require_auth};
