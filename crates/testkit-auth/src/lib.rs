//! Credential discovery for the futures testnet harness
//!
//! This crate reads API credential sets from the process environment and
//! builds the read-only [`CredentialConfig`] values the suite orchestrator
//! pairs with test cases. Signing itself is delegated to the generated
//! client; the harness only decides which signing scheme a config uses and
//! keeps the key material safe until the client needs it.
//!
//! # Example
//!
//! ```no_run
//! use testkit_auth::discover_from_env;
//! use testkit_types::AuthLevel;
//!
//! let configs = discover_from_env();
//! for config in &configs {
//!     println!("{} ({})", config.name(), config.level());
//! }
//! let tradable = configs.iter().filter(|c| c.satisfies(AuthLevel::Trade)).count();
//! println!("{} config(s) can run trading cases", tradable);
//! ```
//!
//! # Environment Variables
//!
//! - `BINANCE_API_KEY` / `BINANCE_SECRET_KEY` - HMAC credential pair
//! - `BINANCE_RSA_API_KEY` / `BINANCE_RSA_PRIVATE_KEY_PATH` - RSA key + PEM file
//! - `BINANCE_ED25519_API_KEY` / `BINANCE_ED25519_PRIVATE_KEY_PATH` - Ed25519 key + PEM file
//! - `TEST_ALL_AUTH_TYPES` - when `"true"`, exercise every configured scheme

mod credentials;
mod error;

pub use credentials::{discover_from_env, CredentialConfig, KeyMaterial, SigningScheme};
pub use error::{AuthError, AuthResult};
