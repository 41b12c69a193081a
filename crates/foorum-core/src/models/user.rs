use serde::{Deserialize, Serialize};

/// A registered account as persisted under `registeredUsers`.
///
/// Passwords are stored in plaintext by design: accounts here are local
/// fixture-grade data with no security model behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Account {
    /// The password-free projection handed out to callers.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// The identity of a signed-in user, persisted under the `user` key while a
/// session is active. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_drops_password() {
        let account = Account {
            id: "abc123def".to_string(),
            email: "new@x.com".to_string(),
            username: "newu".to_string(),
            password: "secret1".to_string(),
            avatar: None,
        };

        let profile = account.profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("secret1"));
        assert!(!json.contains("password"));
        assert_eq!(profile.email, "new@x.com");
    }
}
