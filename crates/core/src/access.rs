//! Caller identity and pre-computed capabilities.
//!
//! Authentication and role resolution happen upstream; the engine only checks
//! that the capability for an operation is present.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use quire_shared::types::UserId;

/// A permission the engine checks before touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Submit drafts for approval.
    Submit,
    /// Approve pending entries.
    Approve,
    /// Post entries to the ledger.
    Post,
    /// Reverse posted entries.
    Reverse,
    /// Bulk-import entries.
    Import,
    /// Export entries.
    Export,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Self; 6] = [
        Self::Submit,
        Self::Approve,
        Self::Post,
        Self::Reverse,
        Self::Import,
        Self::Export,
    ];

    /// Returns the string representation of the capability.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Post => "post",
            Self::Reverse => "reverse",
            Self::Import => "import",
            Self::Export => "export",
        }
    }

    /// Parses a capability name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Who is acting.
    pub id: UserId,
    capabilities: BTreeSet<Capability>,
}

impl Actor {
    /// Creates an actor holding the given capabilities.
    #[must_use]
    pub fn new(id: UserId, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            id,
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// Creates an actor holding every capability.
    #[must_use]
    pub fn with_all_capabilities(id: UserId) -> Self {
        Self::new(id, Capability::ALL)
    }

    /// Returns true if the actor holds the capability.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Iterates the actor's capabilities in a stable order.
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }
}
