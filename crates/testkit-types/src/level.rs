//! Authorization levels for test cases and credentials

use serde::{Deserialize, Serialize};

/// Authorization level required by a test case, or granted by a credential set.
///
/// Levels are ordered: `None < Read < Trade`. A credential set can run a
/// test case iff its level is greater than or equal to the case's required
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuthLevel {
    /// Public endpoints, no authentication needed
    None,
    /// Read-only account data (balances, positions, user streams)
    Read,
    /// Order placement and other mutating operations
    Trade,
}

impl AuthLevel {
    /// Check whether this level is sufficient for the given requirement
    pub fn satisfies(self, required: AuthLevel) -> bool {
        self >= required
    }
}

impl std::fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthLevel::None => write!(f, "NONE"),
            AuthLevel::Read => write!(f, "READ"),
            AuthLevel::Trade => write!(f, "TRADE"),
        }
    }
}
