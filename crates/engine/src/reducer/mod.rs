// Reducer banks, one per document type.

mod network_profile;
mod payment_terms;
mod rfp;
mod workstream;

pub use network_profile::NetworkProfile;
pub use payment_terms::PaymentTerms;
pub use rfp::RequestForProposals;
pub use workstream::Workstream;
