use std::env;
use std::fmt;

use auth::Authenticator;
use auth::HashParameters;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Environment variable the signing secret has historically been read from.
pub const LEGACY_SECRET_VARIABLE: &str = "JWT_ENCODING_SECRET";

/// Longest session lifetime accepted: one year.
pub const MAX_EXPIRATION_HOURS: i64 = 365 * 24;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: HashParameters,
    #[serde(default)]
    pub hashing: HashingConfig,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HashingConfig {
    pub max_concurrent: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

fn default_expiration_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `JWT_ENCODING_SECRET` (for `jwt.secret` only)
    /// 2. Environment variables (JWT__SECRET, PASSWORD__MEMORY_KIB, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    ///
    /// A missing or empty signing secret is an error: callers abort startup.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .set_override_option("jwt.secret", env::var(LEGACY_SECRET_VARIABLE).ok())?
            .build()?;

        Self::from_configuration(configuration)
    }

    /// Deserialize and validate an already assembled configuration.
    pub fn from_configuration(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be set (JWT__SECRET or {})",
                LEGACY_SECRET_VARIABLE
            )));
        }

        if !(1..=MAX_EXPIRATION_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}, got {}",
                MAX_EXPIRATION_HOURS, self.jwt.expiration_hours
            )));
        }

        if self.hashing.max_concurrent == 0 {
            return Err(ConfigError::Message(
                "hashing.max_concurrent must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the credential primitives described by this configuration.
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        let lifetime = Duration::try_hours(self.jwt.expiration_hours).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_hours {} is out of range",
                self.jwt.expiration_hours
            ))
        })?;

        Ok(Authenticator::new(self.jwt.secret.as_bytes())
            .with_password_params(self.password)
            .with_token_lifetime(lifetime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        ConfigBuilder::builder()
    }

    #[test]
    fn test_defaults_with_secret_only() {
        let configuration = builder()
            .set_override("jwt.secret", "test-secret")
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        let config = Config::from_configuration(configuration).expect("Invalid configuration");

        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.password, HashParameters::default());
        assert_eq!(config.hashing.max_concurrent, 4);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let configuration = builder()
            .set_override("jwt.expiration_hours", 24)
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        assert!(Config::from_configuration(configuration).is_err());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let configuration = builder()
            .set_override("jwt.secret", "  ")
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        assert!(matches!(
            Config::from_configuration(configuration),
            Err(ConfigError::Message(_))
        ));
    }

    #[test]
    fn test_partial_password_parameters() {
        let configuration = builder()
            .set_override("jwt.secret", "test-secret")
            .expect("Failed to set override")
            .set_override("password.memory_kib", 19456)
            .expect("Failed to set override")
            .set_override("hashing.max_concurrent", 0)
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        assert!(Config::from_configuration(configuration).is_err());

        let configuration = builder()
            .set_override("jwt.secret", "test-secret")
            .expect("Failed to set override")
            .set_override("password.memory_kib", 19456)
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        let config = Config::from_configuration(configuration).expect("Invalid configuration");
        assert_eq!(config.password.memory_kib, 19456);
        assert_eq!(config.password.iterations, HashParameters::DEFAULT_ITERATIONS);
    }

    #[test]
    fn test_expiration_hours_out_of_range_is_rejected() {
        for hours in [0, -1, MAX_EXPIRATION_HOURS + 1, 10_000_000_000] {
            let configuration = builder()
                .set_override("jwt.secret", "test-secret")
                .expect("Failed to set override")
                .set_override("jwt.expiration_hours", hours)
                .expect("Failed to set override")
                .build()
                .expect("Failed to build configuration");

            assert!(
                matches!(
                    Config::from_configuration(configuration),
                    Err(ConfigError::Message(_))
                ),
                "expiration_hours = {} was accepted",
                hours
            );
        }
    }

    #[test]
    fn test_longest_expiration_is_usable() {
        let configuration = builder()
            .set_override("jwt.secret", "test-secret")
            .expect("Failed to set override")
            .set_override("jwt.expiration_hours", MAX_EXPIRATION_HOURS)
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        let config = Config::from_configuration(configuration).expect("Invalid configuration");
        let authenticator = config.authenticator().expect("Failed to build authenticator");

        let token = authenticator
            .generate_token(1, "alice")
            .expect("Failed to generate token");
        let claims = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");
        assert_eq!(claims.exp - claims.iat, MAX_EXPIRATION_HOURS * 60 * 60);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let jwt = JwtConfig {
            secret: "super-secret-value".to_string(),
            expiration_hours: 24,
        };

        assert!(!format!("{:?}", jwt).contains("super-secret-value"));
    }

    #[test]
    fn test_authenticator_uses_configured_lifetime() {
        let configuration = builder()
            .set_override("jwt.secret", "test-secret")
            .expect("Failed to set override")
            .set_override("jwt.expiration_hours", 2)
            .expect("Failed to set override")
            .set_override("password.memory_kib", 1024)
            .expect("Failed to set override")
            .set_override("password.iterations", 1)
            .expect("Failed to set override")
            .set_override("password.parallelism", 1)
            .expect("Failed to set override")
            .build()
            .expect("Failed to build configuration");

        let config = Config::from_configuration(configuration).expect("Invalid configuration");
        let authenticator = config.authenticator().expect("Failed to build authenticator");

        let token = authenticator
            .generate_token(1, "alice")
            .expect("Failed to generate token");
        let claims = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);

        let hash = authenticator
            .hash_password("pw")
            .expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
    }
}
