//! SQLite repositories
//!
//! Types (UserRow, NewUser, etc.) should be imported from `crate::data::types`.

pub mod user;

pub use user::{
    count_admins, create_user, delete_user, ensure_admin, get_by_username, get_user, list_users,
    update_user,
};
