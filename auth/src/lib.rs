//! Authentication primitives for the account service
//!
//! Provides the credential-handling building blocks the service composes:
//! - Password hashing (Argon2id)
//! - Session token issuing and verification (JWT, HS256)
//! - Password reset code generation and digesting
//!
//! All secrets and lifetimes are injected at construction; nothing in this
//! crate reads ambient global state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", 24);
//! let token = issuer.issue("account-123").unwrap();
//! let claims = issuer.verify(&token).unwrap();
//! assert_eq!(claims.sub, "account-123");
//! ```
//!
//! ## Reset Codes
//! ```
//! use auth::reset;
//!
//! let generated = reset::generate();
//! assert_eq!(generated.digest, reset::digest(&generated.code));
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;
pub mod reset;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use reset::GeneratedCode;
