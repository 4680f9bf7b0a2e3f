//! Infrastructure adapters for config, git, pickers, locking, and display.

pub mod config;
pub mod display;
pub mod git;
pub mod lock;
pub mod picker;
