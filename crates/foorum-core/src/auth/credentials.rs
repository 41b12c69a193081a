use std::sync::{Arc, Mutex};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::models::{Account, UserProfile};
use crate::storage::{StorageBackend, StorageError, StorageExt};

/// Storage key for the registered account list
const REGISTERED_USERS_KEY: &str = "registeredUsers";

/// Length of synthesized account ids (base-36 characters)
const ACCOUNT_ID_LENGTH: usize = 9;

/// An account compiled into the binary. Built-ins are immutable, carry stable
/// ids, and are never written to storage.
struct BuiltinAccount {
    id: &'static str,
    email: &'static str,
    username: &'static str,
    password: &'static str,
}

const BUILTIN_ACCOUNTS: &[BuiltinAccount] = &[
    BuiltinAccount {
        id: "demo",
        email: "demo@example.com",
        username: "Demo User",
        password: "password123",
    },
    BuiltinAccount {
        id: "test",
        email: "test@user.com",
        username: "Test User",
        password: "testpass",
    },
];

/// Resolves login attempts and registrations against the two-tier account
/// set: built-in accounts first, then registered accounts in insertion order.
/// All matching is case-sensitive and exact.
pub struct CredentialStore {
    storage: Arc<dyn StorageBackend>,
    registered: Mutex<Vec<Account>>,
}

impl CredentialStore {
    /// Load the registered account list from storage. A malformed list is
    /// fixture-grade data, so it degrades to empty rather than failing.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Result<Self, StorageError> {
        let registered = match storage.get_json::<Vec<Account>>(REGISTERED_USERS_KEY) {
            Ok(Some(accounts)) => accounts,
            Ok(None) => Vec::new(),
            Err(StorageError::Malformed { key, source }) => {
                warn!(key, error = %source, "registered account list is malformed, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        debug!(count = registered.len(), "loaded registered accounts");
        Ok(Self {
            storage,
            registered: Mutex::new(registered),
        })
    }

    /// Resolve an (email, password) pair to a profile, or `None` on no match.
    pub fn find_by_credentials(&self, email: &str, password: &str) -> Option<UserProfile> {
        for builtin in BUILTIN_ACCOUNTS {
            if builtin.email == email && builtin.password == password {
                return Some(UserProfile {
                    id: builtin.id.to_string(),
                    email: builtin.email.to_string(),
                    username: builtin.username.to_string(),
                    avatar: None,
                });
            }
        }

        let registered = self.registered.lock().unwrap();
        registered
            .iter()
            .find(|account| account.email == email && account.password == password)
            .map(Account::profile)
    }

    /// True if the email belongs to any built-in or registered account.
    pub fn email_exists(&self, email: &str) -> bool {
        let registered = self.registered.lock().unwrap();
        Self::email_taken(&registered, email)
    }

    /// Create a new registered account. Returns `Ok(None)` when the email is
    /// already taken. The existence check and the append are performed under
    /// one lock so concurrent registrations cannot race past each other.
    pub fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, StorageError> {
        let mut registered = self.registered.lock().unwrap();
        if Self::email_taken(&registered, email) {
            debug!(email, "registration rejected, email already exists");
            return Ok(None);
        }

        let account = Account {
            id: generate_account_id(),
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            avatar: None,
        };
        registered.push(account.clone());

        if let Err(e) = self.storage.set_json(REGISTERED_USERS_KEY, &*registered) {
            // Keep memory and storage in agreement
            registered.pop();
            return Err(e);
        }

        info!(email, id = %account.id, "registered new account");
        Ok(Some(account.profile()))
    }

    fn email_taken(registered: &[Account], email: &str) -> bool {
        BUILTIN_ACCOUNTS.iter().any(|b| b.email == email)
            || registered.iter().any(|a| a.email == email)
    }
}

fn generate_account_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..ACCOUNT_ID_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStorage::new())).unwrap()
    }

    #[test]
    fn test_builtin_login_exact_match() {
        let creds = store();
        let profile = creds
            .find_by_credentials("demo@example.com", "password123")
            .unwrap();
        assert_eq!(profile.id, "demo");
        assert_eq!(profile.username, "Demo User");
    }

    #[test]
    fn test_builtin_login_rejects_mutations() {
        let creds = store();
        assert!(creds.find_by_credentials("demo@example.com", "password124").is_none());
        assert!(creds.find_by_credentials("demo@example.con", "password123").is_none());
        // Matching is case-sensitive
        assert!(creds.find_by_credentials("Demo@example.com", "password123").is_none());
        assert!(creds.find_by_credentials("demo@example.com", "Password123").is_none());
    }

    #[test]
    fn test_register_then_login() {
        let creds = store();
        let profile = creds
            .register("new@x.com", "newu", "secret1")
            .unwrap()
            .unwrap();
        assert_eq!(profile.email, "new@x.com");
        assert_eq!(profile.id.len(), ACCOUNT_ID_LENGTH);
        assert!(profile.id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

        assert!(creds.email_exists("new@x.com"));
        let found = creds.find_by_credentials("new@x.com", "secret1").unwrap();
        assert_eq!(found.id, profile.id);
    }

    #[test]
    fn test_register_duplicate_email_conflicts() {
        let creds = store();
        assert!(creds.register("new@x.com", "newu", "secret1").unwrap().is_some());
        assert!(creds.register("new@x.com", "other", "secret2").unwrap().is_none());
        // Built-in emails are taken too
        assert!(creds.register("demo@example.com", "imposter", "pw").unwrap().is_none());
    }

    #[test]
    fn test_email_exists_is_case_sensitive() {
        let creds = store();
        assert!(creds.email_exists("demo@example.com"));
        assert!(!creds.email_exists("DEMO@example.com"));
        assert!(!creds.email_exists("nobody@example.com"));
    }

    #[test]
    fn test_registered_accounts_survive_reload() {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let first = CredentialStore::new(Arc::clone(&storage)).unwrap();
        let profile = first.register("new@x.com", "newu", "secret1").unwrap().unwrap();

        let second = CredentialStore::new(storage).unwrap();
        let found = second.find_by_credentials("new@x.com", "secret1").unwrap();
        assert_eq!(found, profile);
    }

    #[test]
    fn test_malformed_registered_list_degrades_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(REGISTERED_USERS_KEY, "[{broken").unwrap();

        let creds = CredentialStore::new(storage).unwrap();
        assert!(!creds.email_exists("new@x.com"));
        // And the store is still usable
        assert!(creds.register("new@x.com", "newu", "secret1").unwrap().is_some());
    }
}
