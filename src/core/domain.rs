//! Project domains used to pick a task-breakdown template.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Subject area of a project or task.
///
/// The declaration order is the tie-break priority used by the classifier:
/// earlier variants win ties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Auth,
    Api,
    Frontend,
    Database,
    Generic,
}

impl Domain {
    /// Every domain, in tie-break priority order.
    pub const ALL: [Domain; 5] = [
        Domain::Auth,
        Domain::Api,
        Domain::Frontend,
        Domain::Database,
        Domain::Generic,
    ];

    /// Domains that carry keyword signals (everything but `Generic`).
    pub const SPECIFIC: [Domain; 4] = [Domain::Auth, Domain::Api, Domain::Frontend, Domain::Database];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Auth => "auth",
            Domain::Api => "api",
            Domain::Frontend => "frontend",
            Domain::Database => "database",
            Domain::Generic => "generic",
        }
    }

    /// Parse a domain name, mapping anything unrecognised to `Generic`.
    ///
    /// This is the only way caller-supplied domain names enter the engine, so
    /// `UnknownDomain` never escapes.
    pub fn parse_or_generic(name: &str) -> Self {
        match name.parse() {
            Ok(domain) => domain,
            Err(err) => {
                tracing::warn!(%err, "falling back to generic domain");
                Domain::Generic
            }
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::Generic
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auth" | "authentication" => Ok(Domain::Auth),
            "api" => Ok(Domain::Api),
            "frontend" | "ui" => Ok(Domain::Frontend),
            "database" | "db" => Ok(Domain::Database),
            "generic" => Ok(Domain::Generic),
            other => Err(Error::UnknownDomain(other.to_string())),
        }
    }
}
