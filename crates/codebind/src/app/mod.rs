//! Application layer orchestrating the selection-to-artifact pipeline.

pub mod assemble;
pub mod bind;
pub mod filter;
pub mod selection;
pub mod session;
pub mod traverse;
pub mod tree;
