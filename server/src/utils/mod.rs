//! Shared utilities

pub mod crypto;
pub mod file;
pub mod password;
pub mod terminal;
