// Security module for authentication and path validation
//
// Every dispatch passes through the AuthGate; file operations are
// additionally restricted to the configured root directory.

pub mod auth;
pub mod path_validator;

pub use auth::{AuthError, AuthGate, bearer_credential};
pub use path_validator::{PathSecurityError, validate_new_path, validate_path};
