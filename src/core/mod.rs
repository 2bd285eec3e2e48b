//! Core data types and models

pub mod item;
pub mod page;
pub mod query;
pub mod status;

pub use item::*;
pub use page::*;
pub use query::*;
pub use status::*;
