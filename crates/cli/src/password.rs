//! Password hashing for the fixture login.
//!
//! Uses Argon2id at the lowest cost the algorithm allows. The seeded password
//! is a published development credential; never reuse these parameters for
//! real accounts.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed (bad parameters or salt).
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),

    /// The candidate does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
}

/// Argon2id with minimum memory, iterations and parallelism.
fn fixture_hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(
        Params::MIN_M_COST,
        Params::MIN_T_COST,
        Params::MIN_P_COST,
        None,
    )
    .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string with a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if Argon2 rejects the input.
pub fn hash_password(password: &SecretString) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    fixture_hasher()?
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a candidate password against a stored PHC hash.
///
/// Cost parameters are read from the hash itself.
///
/// # Errors
///
/// Returns `PasswordError::Malformed` if the hash does not parse and
/// `PasswordError::Mismatch` if the password is wrong.
pub fn verify_password(candidate: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password(&SecretString::from("racheliscool")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("racheliscool", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = hash_password(&SecretString::from("racheliscool")).unwrap();
        for wrong in ["", "racheliscool ", "RACHELISCOOL", "rachelisnotcool"] {
            assert!(matches!(
                verify_password(wrong, &hash),
                Err(PasswordError::Mismatch)
            ));
        }
    }

    #[test]
    fn test_uses_minimum_cost() {
        let hash = hash_password(&SecretString::from("racheliscool")).unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        let params = Params::try_from(&parsed).unwrap();
        assert_eq!(params.m_cost(), Params::MIN_M_COST);
        assert_eq!(params.t_cost(), Params::MIN_T_COST);
    }

    #[test]
    fn test_salts_differ() {
        let secret = SecretString::from("racheliscool");
        assert_ne!(hash_password(&secret).unwrap(), hash_password(&secret).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("racheliscool", "not-a-phc-string"),
            Err(PasswordError::Malformed(_))
        ));
    }
}
