//! Application state management for the foorum TUI.
//!
//! The `App` struct owns the core stores (session, feed), the UI state
//! (focus, dialogs, composer), and the purely local engagement state that is
//! never written back to storage. Sign-in and sign-up run on background
//! tasks so the simulated latency never blocks the event loop; results come
//! back over an mpsc channel drained once per frame.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{error, warn};

use foorum_core::{
    CredentialStore, FeedStore, FileStorage, SessionManager, StorageBackend, StorageError,
    UserProfile,
};

use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Auth runs one task at a time, so a small buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for email input
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for username input
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the post composer body
pub const MAX_BODY_LENGTH: usize = 500;

/// Minimum password length enforced by the sign-up form
const MIN_PASSWORD_LENGTH: usize = 6;

/// Local engagement seeding bounds (exclusive), mirroring the fake counts
/// the feed renders for posts nobody has interacted with
const SEED_LIKES_BOUND: u32 = 20;
const SEED_COMMENTS_BOUND: u32 = 10;

/// Emoji offered by the composer picker
pub const EMOJI_CHOICES: &[&str] = &["😊", "🥴", "🤞", "💀", "🔥", "🎉", "😂", "❤️"];

// ============================================================================
// UI State Types
// ============================================================================

/// Top-level application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Authenticating,
    ConfirmingQuit,
    Quitting,
}

/// Current focus area in the normal view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Feed,
}

/// Which flow the auth dialog is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Field focus inside the auth dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Username,
    Password,
    ConfirmPassword,
}

/// State of the sign-in / sign-up dialog
#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: AuthField,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub error: Option<String>,
    pub pending: bool,
}

impl AuthForm {
    fn new(mode: AuthMode, prefill_email: Option<&str>) -> Self {
        Self {
            mode,
            focus: AuthField::Email,
            email: prefill_email.unwrap_or_default().to_string(),
            username: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            error: None,
            pending: false,
        }
    }

    /// Cycle focus through the fields visible in the current mode
    pub fn next_field(&mut self) {
        self.focus = match (self.mode, self.focus) {
            (AuthMode::SignIn, AuthField::Email) => AuthField::Password,
            (AuthMode::SignIn, _) => AuthField::Email,
            (AuthMode::SignUp, AuthField::Email) => AuthField::Username,
            (AuthMode::SignUp, AuthField::Username) => AuthField::Password,
            (AuthMode::SignUp, AuthField::Password) => AuthField::ConfirmPassword,
            (AuthMode::SignUp, AuthField::ConfirmPassword) => AuthField::Email,
        };
    }

    pub fn prev_field(&mut self) {
        self.focus = match (self.mode, self.focus) {
            (AuthMode::SignIn, AuthField::Email) => AuthField::Password,
            (AuthMode::SignIn, _) => AuthField::Email,
            (AuthMode::SignUp, AuthField::Email) => AuthField::ConfirmPassword,
            (AuthMode::SignUp, AuthField::Username) => AuthField::Email,
            (AuthMode::SignUp, AuthField::Password) => AuthField::Username,
            (AuthMode::SignUp, AuthField::ConfirmPassword) => AuthField::Password,
        };
    }

    pub fn focused_input(&mut self) -> &mut String {
        match self.focus {
            AuthField::Email => &mut self.email,
            AuthField::Username => &mut self.username,
            AuthField::Password => &mut self.password,
            AuthField::ConfirmPassword => &mut self.confirm_password,
        }
    }

    fn focused_limit(&self) -> usize {
        match self.focus {
            AuthField::Email => MAX_EMAIL_LENGTH,
            AuthField::Username => MAX_USERNAME_LENGTH,
            AuthField::Password | AuthField::ConfirmPassword => MAX_PASSWORD_LENGTH,
        }
    }
}

/// State of the post composer
#[derive(Debug, Default)]
pub struct Composer {
    pub body: String,
    /// Index into `EMOJI_CHOICES`, or none selected
    pub emoji: Option<usize>,
}

impl Composer {
    pub fn cycle_emoji(&mut self) {
        self.emoji = match self.emoji {
            None => Some(0),
            Some(i) if i + 1 < EMOJI_CHOICES.len() => Some(i + 1),
            Some(_) => None,
        };
    }

    pub fn selected_emoji(&self) -> Option<&'static str> {
        self.emoji.map(|i| EMOJI_CHOICES[i])
    }
}

/// Per-post engagement shown in the feed. Purely local UI state: counts are
/// seeded randomly per run and like toggles are never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engagement {
    pub likes: u32,
    pub liked: bool,
    pub comments: u32,
    pub shares: u32,
}

/// Messages sent back from background tasks
#[derive(Debug)]
pub enum BackgroundMessage {
    AuthFinished {
        mode: AuthMode,
        email: String,
        result: Result<bool, StorageError>,
    },
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    pub state: AppState,
    pub focus: Focus,
    pub session: Arc<SessionManager>,
    pub feed: FeedStore,
    pub auth: AuthForm,
    pub composer: Composer,
    pub engagement: HashMap<String, Engagement>,
    /// Index of the selected post in the feed
    pub selected: usize,
    pub status_message: Option<String>,
    tx: mpsc::Sender<BackgroundMessage>,
    rx: mpsc::Receiver<BackgroundMessage>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(config.data_dir()?)?);

        let credentials = Arc::new(CredentialStore::new(Arc::clone(&storage))?);
        let session = Arc::new(SessionManager::new(Arc::clone(&storage), credentials));
        let feed = FeedStore::load(storage)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            auth: AuthForm::new(AuthMode::SignIn, config.last_email.as_deref()),
            config,
            state: AppState::Normal,
            focus: Focus::Feed,
            session,
            feed,
            composer: Composer::default(),
            engagement: HashMap::new(),
            selected: 0,
            status_message: None,
            tx,
            rx,
        };
        app.seed_engagement();
        Ok(app)
    }

    /// Make sure every post in the feed has a local engagement entry.
    /// Existing entries keep their counts; fresh posts start at zero.
    fn seed_engagement(&mut self) {
        let mut rng = rand::thread_rng();
        for post in self.feed.posts() {
            self.engagement.entry(post.id).or_insert_with(|| Engagement {
                likes: rng.gen_range(0..SEED_LIKES_BOUND),
                liked: false,
                comments: rng.gen_range(0..SEED_COMMENTS_BOUND),
                shares: 0,
            });
        }
    }

    pub fn engagement_for(&self, post_id: &str) -> Engagement {
        self.engagement.get(post_id).copied().unwrap_or_default()
    }

    pub fn toggle_like_selected(&mut self) {
        let posts = self.feed.posts();
        let Some(post) = posts.get(self.selected) else {
            return;
        };

        let entry = self.engagement.entry(post.id.clone()).or_default();
        if entry.liked {
            entry.likes = entry.likes.saturating_sub(1);
            entry.liked = false;
        } else {
            entry.likes += 1;
            entry.liked = true;
        }
    }

    // ===== Auth dialog =====

    /// Open the auth dialog, prefilling the last used email for sign-in
    pub fn start_auth(&mut self, mode: AuthMode) {
        self.auth = AuthForm::new(mode, self.config.last_email.as_deref());
        self.state = AppState::Authenticating;
    }

    pub fn close_auth(&mut self) {
        self.state = AppState::Normal;
    }

    pub fn switch_auth_mode(&mut self) {
        let mode = match self.auth.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.auth = AuthForm::new(mode, self.config.last_email.as_deref());
    }

    /// Type a character into the focused auth field
    pub fn auth_input_char(&mut self, c: char) {
        let limit = self.auth.focused_limit();
        let input = self.auth.focused_input();
        if can_add_input_char(input.chars().count(), limit, c) {
            input.push(c);
        }
    }

    pub fn auth_backspace(&mut self) {
        self.auth.focused_input().pop();
    }

    /// Validate the form and kick off the background sign-in/sign-up task.
    /// Validation failures surface inline; the dialog stays open either way
    /// until a success message arrives.
    pub fn submit_auth(&mut self) {
        if self.auth.pending {
            return;
        }
        self.auth.error = None;

        let email = self.auth.email.trim().to_string();
        let password = self.auth.password.clone();
        if email.is_empty() || password.is_empty() {
            self.auth.error = Some("Email and password are required".to_string());
            return;
        }

        let mode = self.auth.mode;
        let username = match mode {
            AuthMode::SignIn => String::new(),
            AuthMode::SignUp => {
                if password.chars().count() < MIN_PASSWORD_LENGTH {
                    self.auth.error =
                        Some("Password must be at least 6 characters".to_string());
                    return;
                }
                if password != self.auth.confirm_password {
                    self.auth.error = Some("Passwords do not match".to_string());
                    return;
                }

                // Blank username falls back to the email local-part
                let typed = self.auth.username.trim();
                if typed.is_empty() {
                    derive_username(&email)
                } else {
                    typed.to_string()
                }
            }
        };

        self.auth.pending = true;

        let session = Arc::clone(&self.session);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match mode {
                AuthMode::SignIn => session.login(&email, &password).await,
                AuthMode::SignUp => session.register(&email, &username, &password).await,
            };
            let _ = tx
                .send(BackgroundMessage::AuthFinished {
                    mode,
                    email,
                    result,
                })
                .await;
        });
    }

    /// Drain background task results. Called once per event-loop tick.
    pub fn check_background_tasks(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                BackgroundMessage::AuthFinished {
                    mode,
                    email,
                    result,
                } => self.finish_auth(mode, email, result),
            }
        }
    }

    fn finish_auth(&mut self, mode: AuthMode, email: String, result: Result<bool, StorageError>) {
        self.auth.pending = false;

        match result {
            Ok(true) => {
                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "failed to save config");
                }

                let username = self
                    .session
                    .current_user()
                    .map(|u| u.username)
                    .unwrap_or_default();
                self.status_message = Some(format!("Signed in as {}", username));
                self.state = AppState::Normal;
            }
            Ok(false) => {
                self.auth.error = Some(match mode {
                    AuthMode::SignIn => "Invalid email or password".to_string(),
                    AuthMode::SignUp => "Email already exists".to_string(),
                });
            }
            Err(e) => {
                error!(error = %e, "auth task failed");
                self.auth.error = Some("An error occurred. Please try again.".to_string());
            }
        }
    }

    // ===== Session =====

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            error!(error = %e, "failed to clear persisted session");
        }
        self.status_message = Some("Signed out".to_string());
    }

    // ===== Composer =====

    pub fn composer_input_char(&mut self, c: char) {
        // Allow newlines in the body, but nothing else from the control range
        if c == '\n' || can_add_input_char(self.composer.body.chars().count(), MAX_BODY_LENGTH, c)
        {
            self.composer.body.push(c);
        }
    }

    pub fn composer_backspace(&mut self) {
        self.composer.body.pop();
    }

    /// Submit the composer. Signed-out users get the auth dialog instead,
    /// matching the gate the feed page puts in front of posting.
    pub fn submit_post(&mut self) {
        let Some(user) = self.session.current_user() else {
            self.start_auth(AuthMode::SignIn);
            return;
        };

        if self.composer.body.trim().is_empty() {
            return;
        }

        match self
            .feed
            .create_post(&user, &self.composer.body, self.composer.selected_emoji())
        {
            Ok(Some(post)) => {
                self.composer = Composer::default();
                self.engagement.insert(post.id, Engagement::default());
                self.selected = 0;
                self.status_message = Some("Posted".to_string());
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "failed to persist post");
                self.status_message = Some("An error occurred. Please try again.".to_string());
            }
        }
    }

    // ===== Feed navigation =====

    pub fn select_next(&mut self) {
        let count = self.feed.posts().len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Whether a character may be appended to a length-limited input field
pub fn can_add_input_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && !c.is_control()
}

/// Default username for sign-up when the field is left blank
pub fn derive_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_add_input_char() {
        assert!(can_add_input_char(0, 50, 'a'));
        assert!(can_add_input_char(49, 50, 'z'));
        assert!(!can_add_input_char(50, 50, 'a'));
        assert!(!can_add_input_char(0, 50, '\x00'));
        assert!(!can_add_input_char(0, 50, '\n'));
        assert!(!can_add_input_char(0, 50, '\t'));
    }

    #[test]
    fn test_derive_username() {
        assert_eq!(derive_username("new@x.com"), "new");
        assert_eq!(derive_username("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_auth_form_field_cycle_sign_in() {
        let mut form = AuthForm::new(AuthMode::SignIn, None);
        assert_eq!(form.focus, AuthField::Email);
        form.next_field();
        assert_eq!(form.focus, AuthField::Password);
        form.next_field();
        assert_eq!(form.focus, AuthField::Email);
    }

    #[test]
    fn test_auth_form_field_cycle_sign_up() {
        let mut form = AuthForm::new(AuthMode::SignUp, None);
        form.next_field();
        assert_eq!(form.focus, AuthField::Username);
        form.next_field();
        assert_eq!(form.focus, AuthField::Password);
        form.next_field();
        assert_eq!(form.focus, AuthField::ConfirmPassword);
        form.next_field();
        assert_eq!(form.focus, AuthField::Email);
        form.prev_field();
        assert_eq!(form.focus, AuthField::ConfirmPassword);
    }

    #[test]
    fn test_composer_emoji_cycles_back_to_none() {
        let mut composer = Composer::default();
        assert!(composer.selected_emoji().is_none());

        composer.cycle_emoji();
        assert_eq!(composer.selected_emoji(), Some(EMOJI_CHOICES[0]));

        for _ in 1..EMOJI_CHOICES.len() {
            composer.cycle_emoji();
        }
        assert_eq!(
            composer.selected_emoji(),
            Some(EMOJI_CHOICES[EMOJI_CHOICES.len() - 1])
        );

        composer.cycle_emoji();
        assert!(composer.selected_emoji().is_none());
    }
}
