//! Authentication and authorization module
//!
//! Bcrypt password hashing, JWT bearer tokens and the axum middleware
//! that gates role-specific routes.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{create_token, verify_token, Claims, JwtConfig};
pub use middleware::{
    auth_middleware, require_admin, require_doctor, require_patient, AuthState, AuthenticatedUser,
};
pub use password::{hash_password, verify_password};
