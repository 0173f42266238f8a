// Password hashing and verification

use crate::error::{AuthError, Result};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

/// Password hashing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Bcrypt,
    Argon2,
}

/// Hashes new passwords with one algorithm, verifies against either by
/// sniffing the hash prefix.
#[derive(Clone)]
pub struct PasswordHasher {
    algorithm: HashAlgorithm,
}

impl PasswordHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        match self.algorithm {
            HashAlgorithm::Bcrypt => bcrypt::hash(password, bcrypt::DEFAULT_COST)
                .map_err(|e| AuthError::PasswordHash(e.to_string())),
            HashAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
                Ok(hash.to_string())
            }
        }
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        if hash.starts_with("$2") {
            bcrypt::verify(password, hash).map_err(|e| AuthError::PasswordVerify(e.to_string()))
        } else if hash.starts_with("$argon2") {
            let parsed =
                PasswordHash::new(hash).map_err(|e| AuthError::PasswordVerify(e.to_string()))?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        } else {
            Err(AuthError::PasswordVerify(
                "unknown hash format".to_string(),
            ))
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::Argon2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_roundtrip() {
        let hasher = PasswordHasher::new(HashAlgorithm::Bcrypt);
        let hash = hasher.hash("secret-1").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("secret-1", &hash).unwrap());
        assert!(!hasher.verify("secret-2", &hash).unwrap());
    }

    #[test]
    fn test_argon2_roundtrip() {
        let hasher = PasswordHasher::default();
        let hash = hasher.hash("secret-1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("secret-1", &hash).unwrap());
        assert!(!hasher.verify("secret-2", &hash).unwrap());
    }

    #[test]
    fn test_verify_detects_algorithm() {
        let bcrypt_hash = PasswordHasher::new(HashAlgorithm::Bcrypt)
            .hash("pw")
            .unwrap();
        let verifier = PasswordHasher::default();
        assert!(verifier.verify("pw", &bcrypt_hash).unwrap());
        assert!(verifier.verify("pw", "plaintext").is_err());
    }
}
