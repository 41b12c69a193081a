//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, AuthMode, Focus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle auth dialog
    if matches!(app.state, AppState::Authenticating) {
        handle_auth_input(app, key);
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.focus {
        Focus::Feed => handle_feed_input(app, key),
        Focus::Composer => handle_composer_input(app, key),
    }

    Ok(false)
}

fn handle_feed_input(app: &mut App, key: KeyEvent) {
    app.status_message = None;

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('i') | KeyCode::Tab => {
            // Focusing the composer while signed out asks for auth first,
            // the same gate the editor puts in front of typing
            if app.session.is_authenticated() {
                app.focus = Focus::Composer;
            } else {
                app.start_auth(AuthMode::SignIn);
            }
        }
        KeyCode::Char('o') => {
            if app.session.is_authenticated() {
                app.logout();
            } else {
                app.start_auth(AuthMode::SignIn);
            }
        }
        KeyCode::Char('l') | KeyCode::Char(' ') => app.toggle_like_selected(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Home | KeyCode::Char('g') => app.selected = 0,
        _ => {}
    }
}

fn handle_composer_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => {
            app.focus = Focus::Feed;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            // Alt+Enter inserts a line break
            app.composer_input_char('\n');
        }
        KeyCode::Enter => {
            app.status_message = None;
            app.submit_post();
        }
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.composer.cycle_emoji();
        }
        KeyCode::Backspace => app.composer_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.composer_input_char(c);
        }
        _ => {}
    }
}

fn handle_auth_input(app: &mut App, key: KeyEvent) {
    // Field input is frozen while an auth task is pending
    if app.auth.pending {
        return;
    }

    match key.code {
        KeyCode::Esc => app.close_auth(),
        KeyCode::Enter => app.submit_auth(),
        KeyCode::Tab | KeyCode::Down => app.auth.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.auth.prev_field(),
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.switch_auth_mode();
        }
        KeyCode::Backspace => app.auth_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.auth_input_char(c);
        }
        _ => {}
    }
}
