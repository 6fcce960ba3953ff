// Core value types shared across all document models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two independent operation logs of a document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Global,
    Local,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Global, Scope::Local];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "global" => Ok(Self::Global),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown scope `{other}` (expected `global` or `local`)")),
        }
    }
}

/// A monetary or token amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Amount {
    pub value: f64,
    /// Currency or token unit, e.g. `USD`, `DAI`.
    pub unit: String,
}

impl Amount {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self { value, unit: unit.into() }
    }
}

/// The author of a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Author {
    /// Apply empty-string normalization to the optional fields.
    pub fn normalized(self) -> Self {
        Self {
            id: self.id,
            name: crate::normalize::non_empty(self.name),
            icon: crate::normalize::non_empty(self.icon),
        }
    }
}

/// Empty state for document scopes that carry no data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmptyState {}
