//! Data models for foorum entities.
//!
//! - `Account`: a registered account record, including the plaintext password
//! - `UserProfile`: the password-free projection that represents a session
//! - `Post`: a user-authored feed entry
//!
//! Persisted JSON uses camelCase field names throughout.

pub mod post;
pub mod user;

pub use post::Post;
pub use user::{Account, UserProfile};
