//! Eviction Policy Module
//!
//! Closed set of eviction policies, parsed once at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::LabError;

// == Policy Kind ==
/// Eviction policy applied when the store overflows its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least recently used entries go first
    #[default]
    Lru,
    /// Least frequently used entries go first
    Lfu,
    /// Oldest inserted entries go first, regardless of access
    Fifo,
}

impl PolicyKind {
    /// All policies, in display order.
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Lru, PolicyKind::Lfu, PolicyKind::Fifo];

    /// Lowercase wire name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Lfu => "lfu",
            PolicyKind::Fifo => "fifo",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            "fifo" => Ok(PolicyKind::Fifo),
            _ => Err(LabError::InvalidPolicy(s.to_string())),
        }
    }
}
