use serde::Deserialize;
use serde::Serialize;

/// Argon2id cost parameters.
///
/// New hashes are derived with the hasher's configured instance. Verification
/// never consults it: the parameters embedded in the stored hash are used, so
/// hashes produced under older costs stay verifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashParameters {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes over memory
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u8,

    /// Salt length in bytes
    pub salt_length: u32,

    /// Derived key length in bytes
    pub key_length: u32,
}

impl HashParameters {
    pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    pub const DEFAULT_ITERATIONS: u32 = 3;
    pub const DEFAULT_PARALLELISM: u8 = 2;
    pub const DEFAULT_SALT_LENGTH: u32 = 16;
    pub const DEFAULT_KEY_LENGTH: u32 = 32;

    /// Create a parameter set.
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u8,
        salt_length: u32,
        key_length: u32,
    ) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
            salt_length,
            key_length,
        }
    }

    /// Convert into the `argon2` crate's parameter type.
    ///
    /// # Errors
    /// * `argon2::Error` - A cost is outside the range Argon2 accepts
    pub(crate) fn to_argon2(&self) -> Result<argon2::Params, argon2::Error> {
        argon2::Params::new(
            self.memory_kib,
            self.iterations,
            u32::from(self.parallelism),
            Some(self.key_length as usize),
        )
    }
}

impl Default for HashParameters {
    fn default() -> Self {
        Self {
            memory_kib: Self::DEFAULT_MEMORY_KIB,
            iterations: Self::DEFAULT_ITERATIONS,
            parallelism: Self::DEFAULT_PARALLELISM,
            salt_length: Self::DEFAULT_SALT_LENGTH,
            key_length: Self::DEFAULT_KEY_LENGTH,
        }
    }
}
