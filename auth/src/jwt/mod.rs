pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::IdentityClaims;
pub use codec::SessionTokenCodec;
pub use errors::JwtError;
