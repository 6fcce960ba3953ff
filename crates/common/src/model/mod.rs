// Document state models and their action schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod network_profile;
pub mod payment_terms;
pub mod rfp;
pub mod workstream;

/// The closed set of document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocumentKind {
    PaymentTerms,
    Workstream,
    RequestForProposals,
    NetworkProfile,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::PaymentTerms,
        DocumentKind::Workstream,
        DocumentKind::RequestForProposals,
        DocumentKind::NetworkProfile,
    ];

    pub const fn document_type(self) -> &'static str {
        match self {
            Self::PaymentTerms => payment_terms::DOCUMENT_TYPE,
            Self::Workstream => workstream::DOCUMENT_TYPE,
            Self::RequestForProposals => rfp::DOCUMENT_TYPE,
            Self::NetworkProfile => network_profile::DOCUMENT_TYPE,
        }
    }

    /// Operation names this document type accepts in the global scope.
    pub const fn operations(self) -> &'static [&'static str] {
        match self {
            Self::PaymentTerms => payment_terms::OPERATIONS,
            Self::Workstream => workstream::OPERATIONS,
            Self::RequestForProposals => rfp::OPERATIONS,
            Self::NetworkProfile => network_profile::OPERATIONS,
        }
    }

    /// Accepts the full type string or its short suffix (`workstream`).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            let full = kind.document_type();
            full == value || full.rsplit('/').next() == Some(value)
        })
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_type())
    }
}

impl TryFrom<String> for DocumentKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown document type `{value}`"))
    }
}

impl From<DocumentKind> for String {
    fn from(kind: DocumentKind) -> Self {
        kind.document_type().to_string()
    }
}
