pub mod argon2;
pub mod encoded;
pub mod errors;
pub mod params;

pub use self::argon2::PasswordHasher;
pub use encoded::EncodedHash;
pub use errors::PasswordError;
pub use params::HashParameters;
