//! Shared data types for the user store

mod user;

pub use user::{LastAdminResult, NewUser, UserRole, UserRow, UserUpdate};
