//! Storage layer: the entity cache and the remote catalog it is filled from

pub mod entity_table;
pub mod source;

pub use entity_table::*;
pub use source::*;
