use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::models::UserProfile;
use crate::storage::{StorageBackend, StorageError, StorageExt};

/// Storage key for the persisted session
const SESSION_KEY: &str = "user";

/// Simulated latency for login/registration. Purely cosmetic: the delay
/// always resolves and is never cancelled.
const AUTH_DELAY: Duration = Duration::from_millis(500);

/// Owns the single active session. Signed out unless a login or registration
/// succeeds; the active profile is persisted under `user` and restored on
/// construction, so sessions survive process restarts.
pub struct SessionManager {
    storage: Arc<dyn StorageBackend>,
    credentials: Arc<CredentialStore>,
    current: Mutex<Option<UserProfile>>,
}

impl SessionManager {
    /// Restore the persisted session if one exists. A session that cannot be
    /// read back degrades to signed-out rather than failing startup.
    pub fn new(storage: Arc<dyn StorageBackend>, credentials: Arc<CredentialStore>) -> Self {
        let current = match storage.get_json::<UserProfile>(SESSION_KEY) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "could not restore persisted session, starting signed out");
                None
            }
        };

        if let Some(ref profile) = current {
            info!(email = %profile.email, "restored persisted session");
        }

        Self {
            storage,
            credentials,
            current: Mutex::new(current),
        }
    }

    /// The active session's profile, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.current.lock().unwrap().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    /// Attempt to sign in. `Ok(false)` means the credentials did not match
    /// any account; the current session is left untouched in that case.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, StorageError> {
        tokio::time::sleep(AUTH_DELAY).await;

        let Some(profile) = self.credentials.find_by_credentials(email, password) else {
            debug!(email, "login rejected");
            return Ok(false);
        };

        self.storage.set_json(SESSION_KEY, &profile)?;
        *self.current.lock().unwrap() = Some(profile);
        info!(email, "login succeeded");
        Ok(true)
    }

    /// Attempt to register a new account and sign in as it. `Ok(false)` means
    /// the email is already taken; the current session is left untouched.
    ///
    /// The username is an explicit input: callers wanting the email
    /// local-part as a default derive it themselves.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<bool, StorageError> {
        tokio::time::sleep(AUTH_DELAY).await;

        let Some(profile) = self.credentials.register(email, username, password)? else {
            return Ok(false);
        };

        self.storage.set_json(SESSION_KEY, &profile)?;
        *self.current.lock().unwrap() = Some(profile);
        info!(email, "registration succeeded");
        Ok(true)
    }

    /// Sign out and clear the persisted session. No-op when already signed out.
    pub fn logout(&self) -> Result<(), StorageError> {
        let mut current = self.current.lock().unwrap();
        if current.is_none() {
            return Ok(());
        }

        *current = None;
        self.storage.remove(SESSION_KEY)?;
        info!("logged out");
        Ok(())
    }
}
