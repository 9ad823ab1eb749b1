//! Data storage layer
//!
//! - `sqlite` - Embedded database holding the user table
//! - `types` - Row and input types
//! - `traits` - Repository traits consumed by the API layer
//! - `error` - Unified error type

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::UserRepository;
pub use types::{LastAdminResult, NewUser, UserRole, UserRow, UserUpdate};
