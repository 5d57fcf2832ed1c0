//! Authentication and authorization module

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;

pub use credentials::{normalize_email, CredentialValidator};
pub use jwt::{Claims, Identity, IssuedToken, JwtService};
pub use middleware::{authenticate, extract_token, jwt_auth_middleware, AuthContext, AuthOutcome};
pub use ownership::{Access, OwnedResource, OwnershipGuard};
pub use password::PasswordHasher;
