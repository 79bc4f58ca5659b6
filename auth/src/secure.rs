//! Shared primitives for secret material: OS randomness and constant-time comparison.

use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Fill a fresh buffer of `len` bytes from the operating system RNG.
///
/// # Errors
/// * `rand::Error` - The OS entropy source is unavailable
pub(crate) fn random_bytes(len: usize) -> Result<Vec<u8>, rand::Error> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// Compare two byte slices without an early exit on the first mismatch.
///
/// Slices of different length compare unequal; only the length is leaked.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
