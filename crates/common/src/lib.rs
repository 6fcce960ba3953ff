// docket-common: shared document types, action schema, and collection helpers.

pub mod collection;
pub mod error;
pub mod model;
pub mod normalize;
pub mod patch;
pub mod protocol;
pub mod types;
