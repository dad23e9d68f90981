//! Core types shared by loaders, chunkers, and the structural partitioner

pub mod element;
pub mod record;

pub use element::{Element, ElementCategory};
pub use record::{Metadata, Record};
