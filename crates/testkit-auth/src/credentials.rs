//! Credential configurations and environment discovery
//!
//! # Security
//!
//! HMAC secrets are stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};
use testkit_types::AuthLevel;

/// HMAC API key environment variable
pub const ENV_HMAC_API_KEY: &str = "BINANCE_API_KEY";
/// HMAC secret key environment variable
pub const ENV_HMAC_SECRET_KEY: &str = "BINANCE_SECRET_KEY";
/// RSA API key environment variable
pub const ENV_RSA_API_KEY: &str = "BINANCE_RSA_API_KEY";
/// RSA private key file path environment variable
pub const ENV_RSA_KEY_PATH: &str = "BINANCE_RSA_PRIVATE_KEY_PATH";
/// Ed25519 API key environment variable
pub const ENV_ED25519_API_KEY: &str = "BINANCE_ED25519_API_KEY";
/// Ed25519 private key file path environment variable
pub const ENV_ED25519_KEY_PATH: &str = "BINANCE_ED25519_PRIVATE_KEY_PATH";
/// When `"true"`, discovery returns one config per configured scheme
pub const ENV_TEST_ALL_AUTH_TYPES: &str = "TEST_ALL_AUTH_TYPES";

/// Request signing scheme supported by the generated client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningScheme {
    /// HMAC-SHA256 over the query string / body
    Hmac,
    /// RSA signature with a PEM private key file
    Rsa,
    /// Ed25519 signature with a PEM private key file
    Ed25519,
}

impl std::fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningScheme::Hmac => write!(f, "HMAC"),
            SigningScheme::Rsa => write!(f, "RSA"),
            SigningScheme::Ed25519 => write!(f, "Ed25519"),
        }
    }
}

/// Key material backing a credential configuration
pub enum KeyMaterial {
    /// HMAC secret key (zeroized on drop)
    HmacSecret(SecretString),
    /// Path to a PEM private key file (RSA or Ed25519)
    PrivateKeyFile(PathBuf),
}

impl Clone for KeyMaterial {
    fn clone(&self) -> Self {
        match self {
            // SecretString is not Clone by design; rebuild it explicitly
            Self::HmacSecret(secret) => {
                Self::HmacSecret(SecretString::from(secret.expose_secret().to_string()))
            }
            Self::PrivateKeyFile(path) => Self::PrivateKeyFile(path.clone()),
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HmacSecret(_) => write!(f, "HmacSecret([REDACTED])"),
            Self::PrivateKeyFile(path) => write!(f, "PrivateKeyFile({})", path.display()),
        }
    }
}

/// One credential set the orchestrator can pair with test cases.
///
/// Built once from the environment at startup and read-only afterwards.
/// Every pairing gets its own clone so no signing context is shared across
/// concurrently running cases.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    name: String,
    api_key: Option<String>,
    material: Option<KeyMaterial>,
    scheme: Option<SigningScheme>,
    level: AuthLevel,
}

impl CredentialConfig {
    /// Unauthenticated config for public endpoints
    pub fn public() -> Self {
        Self {
            name: "Public Endpoints".to_string(),
            api_key: None,
            material: None,
            scheme: None,
            level: AuthLevel::None,
        }
    }

    /// HMAC credential pair, full trading access
    pub fn hmac(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            name: "HMAC Authentication".to_string(),
            api_key: Some(api_key.into()),
            material: Some(KeyMaterial::HmacSecret(SecretString::from(
                secret_key.into(),
            ))),
            scheme: Some(SigningScheme::Hmac),
            level: AuthLevel::Trade,
        }
    }

    /// RSA credential with a PEM private key file, full trading access
    pub fn rsa(api_key: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            name: "RSA Authentication".to_string(),
            api_key: Some(api_key.into()),
            material: Some(KeyMaterial::PrivateKeyFile(key_path.into())),
            scheme: Some(SigningScheme::Rsa),
            level: AuthLevel::Trade,
        }
    }

    /// Ed25519 credential with a PEM private key file, full trading access
    pub fn ed25519(api_key: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            name: "Ed25519 Authentication".to_string(),
            api_key: Some(api_key.into()),
            material: Some(KeyMaterial::PrivateKeyFile(key_path.into())),
            scheme: Some(SigningScheme::Ed25519),
            level: AuthLevel::Trade,
        }
    }

    /// Cap the authorization level (e.g. a read-only API key)
    pub fn with_level(mut self, level: AuthLevel) -> Self {
        self.level = level;
        self
    }

    /// Config name, used in outcome records and the summary report
    pub fn name(&self) -> &str {
        &self.name
    }

    /// API key, when this config is authenticated
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Key material backing this config
    pub fn material(&self) -> Option<&KeyMaterial> {
        self.material.as_ref()
    }

    /// Signing scheme, when this config is authenticated
    pub fn scheme(&self) -> Option<SigningScheme> {
        self.scheme
    }

    /// Authorization level this config grants
    pub fn level(&self) -> AuthLevel {
        self.level
    }

    /// Check whether this config can run a case with the given requirement
    pub fn satisfies(&self, required: AuthLevel) -> bool {
        self.level.satisfies(required)
    }

    /// Expose the HMAC secret for handing to the generated client.
    ///
    /// Returns `None` for public and file-backed configs.
    pub fn expose_hmac_secret(&self) -> Option<&str> {
        match &self.material {
            Some(KeyMaterial::HmacSecret(secret)) => Some(secret.expose_secret()),
            _ => None,
        }
    }

    /// Private key file path, for RSA and Ed25519 configs
    pub fn private_key_path(&self) -> Option<&Path> {
        match &self.material {
            Some(KeyMaterial::PrivateKeyFile(path)) => Some(path.as_path()),
            _ => None,
        }
    }

    /// Validate that an authenticated config is actually usable.
    ///
    /// Checks that key material is present and that file-backed keys exist
    /// on disk. Public configs always validate.
    pub fn validate(&self) -> AuthResult<()> {
        if self.level == AuthLevel::None {
            return Ok(());
        }
        if self.api_key.is_none() {
            return Err(AuthError::MissingKeyMaterial(self.name.clone()));
        }
        match &self.material {
            None => Err(AuthError::MissingKeyMaterial(self.name.clone())),
            Some(KeyMaterial::HmacSecret(_)) => Ok(()),
            Some(KeyMaterial::PrivateKeyFile(path)) => {
                if path.exists() {
                    Ok(())
                } else {
                    Err(AuthError::KeyFileNotFound(path.display().to_string()))
                }
            }
        }
    }
}

/// Read a non-empty environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Discover credential configurations from the process environment.
///
/// Ed25519 is the preferred authenticated scheme; HMAC is the fallback
/// when Ed25519 is not configured. Setting `TEST_ALL_AUTH_TYPES=true`
/// returns one config per configured scheme instead, so every signing path
/// in the generated client gets exercised. An unauthenticated public
/// config is always appended last.
///
/// Discovery never fails: absent variables just narrow the returned set.
pub fn discover_from_env() -> Vec<CredentialConfig> {
    let mut configs = Vec::new();
    let test_all = env_var(ENV_TEST_ALL_AUTH_TYPES).as_deref() == Some("true");

    if test_all {
        if let (Some(api_key), Some(secret)) =
            (env_var(ENV_HMAC_API_KEY), env_var(ENV_HMAC_SECRET_KEY))
        {
            configs.push(CredentialConfig::hmac(api_key, secret));
        }
        if let (Some(api_key), Some(path)) = (env_var(ENV_RSA_API_KEY), env_var(ENV_RSA_KEY_PATH))
        {
            configs.push(CredentialConfig::rsa(api_key, path));
        }
    }

    if let (Some(api_key), Some(path)) =
        (env_var(ENV_ED25519_API_KEY), env_var(ENV_ED25519_KEY_PATH))
    {
        configs.push(CredentialConfig::ed25519(api_key, path));
    } else if !test_all {
        if let (Some(api_key), Some(secret)) =
            (env_var(ENV_HMAC_API_KEY), env_var(ENV_HMAC_SECRET_KEY))
        {
            configs.push(CredentialConfig::hmac(api_key, secret));
        }
    }

    configs.push(CredentialConfig::public());

    for config in &configs {
        debug!(name = config.name(), level = %config.level(), "discovered credential config");
    }
    info!(
        "credential discovery found {} config(s) ({} authenticated)",
        configs.len(),
        configs.len() - 1
    );

    configs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment mutation is process-global; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for name in [
            ENV_HMAC_API_KEY,
            ENV_HMAC_SECRET_KEY,
            ENV_RSA_API_KEY,
            ENV_RSA_KEY_PATH,
            ENV_ED25519_API_KEY,
            ENV_ED25519_KEY_PATH,
            ENV_TEST_ALL_AUTH_TYPES,
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_public_config() {
        let config = CredentialConfig::public();
        assert_eq!(config.level(), AuthLevel::None);
        assert!(config.api_key().is_none());
        assert!(config.satisfies(AuthLevel::None));
        assert!(!config.satisfies(AuthLevel::Read));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hmac_config_satisfies_all_levels() {
        let config = CredentialConfig::hmac("api-key", "secret");
        assert_eq!(config.level(), AuthLevel::Trade);
        assert!(config.satisfies(AuthLevel::Trade));
        assert!(config.satisfies(AuthLevel::None));
        assert_eq!(config.expose_hmac_secret(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = CredentialConfig::hmac("api-key", "super-secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_validate_missing_key_file() {
        let config = CredentialConfig::ed25519("api-key", "/nonexistent/ed25519.pem");
        assert!(matches!(
            config.validate(),
            Err(AuthError::KeyFileNotFound(_))
        ));
    }

    #[test]
    fn test_read_only_level_cap() {
        let config = CredentialConfig::hmac("api-key", "secret").with_level(AuthLevel::Read);
        assert!(config.satisfies(AuthLevel::Read));
        assert!(!config.satisfies(AuthLevel::Trade));
    }

    #[test]
    fn test_discovery_empty_env_yields_public_only() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let configs = discover_from_env();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].level(), AuthLevel::None);
    }

    #[test]
    fn test_discovery_prefers_ed25519_over_hmac() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_HMAC_API_KEY, "hmac-key");
        std::env::set_var(ENV_HMAC_SECRET_KEY, "hmac-secret");
        std::env::set_var(ENV_ED25519_API_KEY, "ed-key");
        std::env::set_var(ENV_ED25519_KEY_PATH, "/keys/ed25519.pem");

        let configs = discover_from_env();
        clear_env();

        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].scheme(), Some(SigningScheme::Ed25519));
        assert_eq!(configs[1].level(), AuthLevel::None);
    }

    #[test]
    fn test_discovery_hmac_fallback() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_HMAC_API_KEY, "hmac-key");
        std::env::set_var(ENV_HMAC_SECRET_KEY, "hmac-secret");

        let configs = discover_from_env();
        clear_env();

        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].scheme(), Some(SigningScheme::Hmac));
    }

    #[test]
    fn test_discovery_all_auth_types() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_TEST_ALL_AUTH_TYPES, "true");
        std::env::set_var(ENV_HMAC_API_KEY, "hmac-key");
        std::env::set_var(ENV_HMAC_SECRET_KEY, "hmac-secret");
        std::env::set_var(ENV_RSA_API_KEY, "rsa-key");
        std::env::set_var(ENV_RSA_KEY_PATH, "/keys/rsa.pem");
        std::env::set_var(ENV_ED25519_API_KEY, "ed-key");
        std::env::set_var(ENV_ED25519_KEY_PATH, "/keys/ed25519.pem");

        let configs = discover_from_env();
        clear_env();

        // HMAC + RSA + Ed25519 + public
        assert_eq!(configs.len(), 4);
        assert_eq!(configs[0].scheme(), Some(SigningScheme::Hmac));
        assert_eq!(configs[1].scheme(), Some(SigningScheme::Rsa));
        assert_eq!(configs[2].scheme(), Some(SigningScheme::Ed25519));
    }
}
