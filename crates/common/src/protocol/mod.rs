// Wire types crossing the dispatch boundary.

pub mod action;

pub use action::{Action, Operation};
