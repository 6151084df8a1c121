//! Error types for credential handling

/// Errors that can occur while building credential configurations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A config references key material it does not have
    #[error("Missing key material for {0}")]
    MissingKeyMaterial(String),

    /// A private key file path does not exist on disk
    #[error("Private key file not found: {0}")]
    KeyFileNotFound(String),
}

/// Result type for credential operations
pub type AuthResult<T> = Result<T, AuthError>;
