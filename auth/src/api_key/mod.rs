pub mod errors;
pub mod key;

pub use errors::ApiKeyError;
pub use key::ApiKey;
pub use key::ApiKeyIssuer;
pub use key::ApiKeyParts;
pub use key::PREFIX;
