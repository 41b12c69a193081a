//! Core library for foorum, a local-first social feed.
//!
//! Everything durable flows through a small key-value storage port, so the
//! whole crate runs against an in-memory fake in tests:
//!
//! - `storage`: the port plus file-backed and in-memory implementations
//! - `models`: `Account`, `UserProfile`, `Post`
//! - `auth`: `CredentialStore` (account lookup/registration) and
//!   `SessionManager` (the single persisted session)
//! - `feed`: `FeedStore` (ordered posts, seeded on first run)
//!
//! Presentation is a separate collaborator; this crate never renders
//! anything and signals expected failures through `bool`/`Option` results.

pub mod auth;
pub mod feed;
pub mod models;
pub mod storage;

pub use auth::{CredentialStore, SessionManager};
pub use feed::FeedStore;
pub use models::{Account, Post, UserProfile};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageExt};
