/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
///
/// The OAuth dance itself (provider redirects, code exchange) happens
/// upstream; this crate only consumes the resulting verified profile.

pub mod jwt;
pub mod password;
