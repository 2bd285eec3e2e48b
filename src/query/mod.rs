//! Derived views: filtering and match highlighting

pub mod filter;

pub use filter::*;
