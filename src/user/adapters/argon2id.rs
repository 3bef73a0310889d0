//! Argon2id password hasher.
//!
//! Hashes are stored in the PHC string format
//! (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`), which carries its own
//! parameters. Verification reads them from the stored string, so raising the
//! cost does not invalidate existing hashes.

use crate::user::{
    domain::{PasswordHash, PlainPassword},
    ports::{PasswordHashError, PasswordHasher},
};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash as EncodedHash, PasswordHasher as _, PasswordVerifier as _,
        SaltString, rand_core::OsRng,
    },
};

/// Password hasher using Argon2id with a random salt per hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Default memory cost in KiB.
    pub const DEFAULT_MEMORY_KIB: u32 = 19_456;

    /// Default number of passes over memory.
    pub const DEFAULT_ITERATIONS: u32 = 2;

    /// Creates a hasher with the given memory cost and pass count.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::InvalidParameters`] when Argon2 rejects
    /// the costs, for example a memory cost below 8 KiB or zero iterations.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| PasswordHashError::InvalidParameters(err.to_string()))?;
        Ok(Self { params })
    }

    /// Returns the memory cost in KiB.
    #[must_use]
    pub const fn memory_kib(&self) -> u32 {
        self.params.m_cost()
    }

    /// Returns the number of passes over memory.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHashError::Hashing(err.to_string()))?;
        Ok(PasswordHash::from_encoded(encoded.to_string()))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed = EncodedHash::new(hash.as_str())
            .map_err(|err| PasswordHashError::Malformed(err.to_string()))?;
        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::Malformed(err.to_string())),
        }
    }
}
