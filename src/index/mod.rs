//! Indexes over the entity cache

pub mod page;
pub mod selection;

pub use page::*;
pub use selection::*;
