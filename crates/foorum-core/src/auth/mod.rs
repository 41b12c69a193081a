//! Authentication module for managing user accounts and sessions.
//!
//! This module provides:
//! - `CredentialStore`: built-in plus registered account lookup and registration
//! - `SessionManager`: the single active session, persisted across restarts
//!
//! Expected failures (bad credentials, duplicate email) are signaled through
//! `bool`/`Option` results; only storage faults surface as errors.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::SessionManager;
