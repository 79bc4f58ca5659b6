use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

use super::errors::PasswordError;
use super::params::HashParameters;

/// Algorithm identifier written in the first field.
pub const ALGORITHM: &str = "argon2id";

/// Argon2 version this build derives and verifies (0x13).
pub const VERSION: u32 = 0x13;

/// Self-describing password hash.
///
/// Text form: `$argon2id$v=<ver>$m=<mem>,t=<iter>,p=<par>$<salt>$<key>` where
/// salt and key are standard base64 without padding. Salt and key lengths are
/// not written; on parse they are taken from the decoded byte lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHash {
    pub version: u32,
    pub params: HashParameters,
    pub salt: Vec<u8>,
    pub key: Vec<u8>,
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}$v={}$m={},t={},p={}${}${}",
            ALGORITHM,
            self.version,
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.key),
        )
    }
}

impl FromStr for EncodedHash {
    type Err = PasswordError;

    /// Parse an encoded hash.
    ///
    /// # Errors
    /// * `InvalidHash` - Field count, syntax or base64 is wrong
    /// * `IncompatibleVersion` - Version differs from [`VERSION`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('$').collect();
        if fields.len() != 6 {
            return Err(PasswordError::InvalidHash(format!(
                "expected 6 fields, found {}",
                fields.len()
            )));
        }

        if !fields[0].is_empty() || fields[1] != ALGORITHM {
            return Err(PasswordError::InvalidHash(format!(
                "unsupported algorithm identifier '{}'",
                fields[1]
            )));
        }

        let version = fields[2]
            .strip_prefix("v=")
            .and_then(parse_decimal::<u32>)
            .ok_or_else(|| PasswordError::InvalidHash("malformed version field".to_string()))?;
        if version != VERSION {
            return Err(PasswordError::IncompatibleVersion {
                expected: VERSION,
                found: version,
            });
        }

        let (memory_kib, iterations, parallelism) = parse_costs(fields[3])?;

        let salt = STANDARD_NO_PAD
            .decode(fields[4])
            .map_err(|e| PasswordError::InvalidHash(format!("salt: {}", e)))?;
        let key = STANDARD_NO_PAD
            .decode(fields[5])
            .map_err(|e| PasswordError::InvalidHash(format!("key: {}", e)))?;

        Ok(Self {
            version,
            params: HashParameters {
                memory_kib,
                iterations,
                parallelism,
                salt_length: salt.len() as u32,
                key_length: key.len() as u32,
            },
            salt,
            key,
        })
    }
}

fn parse_costs(field: &str) -> Result<(u32, u32, u8), PasswordError> {
    let malformed = || PasswordError::InvalidHash(format!("malformed parameters '{}'", field));

    let mut parts = field.split(',');
    let memory = parts
        .next()
        .and_then(|p| p.strip_prefix("m="))
        .and_then(parse_decimal::<u32>)
        .ok_or_else(malformed)?;
    let iterations = parts
        .next()
        .and_then(|p| p.strip_prefix("t="))
        .and_then(parse_decimal::<u32>)
        .ok_or_else(malformed)?;
    let parallelism = parts
        .next()
        .and_then(|p| p.strip_prefix("p="))
        .and_then(parse_decimal::<u8>)
        .ok_or_else(malformed)?;

    if parts.next().is_some() {
        return Err(malformed());
    }

    Ok((memory, iterations, parallelism))
}

/// Parse a canonical unsigned decimal: digits only, no sign, no leading zeros.
///
/// Canonical input keeps parse followed by re-encode byte-identical.
fn parse_decimal<T: FromStr>(s: &str) -> Option<T> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));

    if canonical {
        s.parse().ok()
    } else {
        None
    }
}
