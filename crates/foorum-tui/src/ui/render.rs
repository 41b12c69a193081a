//! Rendering for the TUI: header, composer, feed timeline, status bar, and
//! the auth/quit overlays.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, AuthField, AuthMode, Focus};
use crate::utils::{initials, time_ago, truncate_string};

use super::styles;

/// Lines used per feed card: author, body, engagement, separator
const CARD_LINES: usize = 4;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(5), // Composer
            Constraint::Min(8),    // Feed
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_composer(frame, app, chunks[1]);
    render_feed(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::Authenticating) {
        render_auth_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  foo-rum";
    let right = match app.current_user() {
        Some(user) => format!("Hello, {}  [o] sign out ", user.username),
        None => "[o] sign in ".to_string(),
    };

    let padding = (area.width as usize)
        .saturating_sub(title.chars().count())
        .saturating_sub(right.chars().count());

    let line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_composer(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.state, AppState::Normal) && app.focus == Focus::Composer;

    let mut title_spans = vec![Span::raw(" What's on your mind? ")];
    if let Some(emoji) = app.composer.selected_emoji() {
        title_spans.push(Span::raw(format!("{} ", emoji)));
    }
    if focused {
        title_spans.push(Span::styled(
            format!("{}/{} ", app.composer.body.chars().count(), crate::app::MAX_BODY_LENGTH),
            styles::muted_style(),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(title_spans))
        .border_style(styles::border_style(focused));

    let paragraph = if app.composer.body.is_empty() {
        let hint = if focused {
            "Type your post, [enter] to publish"
        } else {
            "Press [i] to write a post"
        };
        Paragraph::new(Span::styled(hint, styles::muted_style())).block(block)
    } else {
        let mut body = app.composer.body.clone();
        if focused {
            body.push('_');
        }
        Paragraph::new(body).wrap(Wrap { trim: false }).block(block)
    };

    frame.render_widget(paragraph, area);
}

fn render_feed(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.state, AppState::Normal) && app.focus == Focus::Feed;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Feed ")
        .border_style(styles::border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let posts = app.feed.posts();
    if posts.is_empty() {
        let empty = Paragraph::new(Span::styled("No posts yet.", styles::muted_style()));
        frame.render_widget(empty, inner);
        return;
    }

    // Window the feed so the selected card stays visible
    let visible = (inner.height as usize / CARD_LINES).max(1);
    let offset = app.selected.saturating_sub(visible - 1);
    let width = inner.width as usize;

    let mut lines: Vec<Line> = Vec::new();
    for (i, post) in posts.iter().enumerate().skip(offset).take(visible) {
        let selected = i == app.selected;
        let marker = if selected { "▌ " } else { "  " };
        let marker_style = if selected {
            styles::title_style()
        } else {
            styles::muted_style()
        };

        // Author line: initials badge, name, relative timestamp
        let mut author_line = Line::from(vec![
            Span::styled(marker, marker_style),
            Span::styled(format!("[{}] ", initials(&post.author_name)), styles::muted_style()),
            Span::styled(post.author_name.clone(), styles::author_style()),
            Span::styled(format!("  {}", time_ago(post.created_at)), styles::muted_style()),
        ]);
        if selected {
            author_line = author_line.style(styles::selected_style());
        }
        lines.push(author_line);

        // Body line, emoji badge first
        let emoji = post.emoji.as_deref().unwrap_or("😊");
        let body = post.body.replace('\n', " ");
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::raw(format!("{} ", emoji)),
            Span::raw(truncate_string(&body, width.saturating_sub(8))),
        ]));

        // Engagement line
        let engagement = app.engagement_for(&post.id);
        let heart_style = if engagement.liked {
            styles::liked_style()
        } else {
            styles::muted_style()
        };
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("♥ {}", engagement.likes), heart_style),
            Span::styled(format!("   🗨 {}", engagement.comments), styles::muted_style()),
            Span::styled(format!("   ↗ {}", engagement.shares), styles::muted_style()),
        ]));

        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match app.current_user() {
            Some(user) => format!(" Signed in as {} ", user.username),
            None => " Browsing as guest ".to_string(),
        }
    };

    let shortcuts = match app.focus {
        Focus::Feed => "[i] compose | [l] like | [j/k] move | [q] quit",
        Focus::Composer => "[enter] post | [alt+enter] newline | [ctrl+e] emoji | [tab] feed",
    };
    let right_text = format!(" {} ", shortcuts);

    let padding = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let line = Line::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line).style(styles::status_bar_style()), area);
}

fn render_auth_overlay(frame: &mut Frame, app: &App) {
    let form = &app.auth;
    let mut height: u16 = match form.mode {
        AuthMode::SignIn => 10,
        AuthMode::SignUp => 14,
    };
    if form.error.is_some() || form.pending {
        height += 2;
    }

    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let title = match form.mode {
        AuthMode::SignIn => "Sign in to continue",
        AuthMode::SignUp => "Create an account to continue",
    };

    let mut lines = vec![
        Line::from(Span::styled(format!("  {}", title), styles::title_style())),
        Line::from(""),
    ];

    lines.push(field_line("Email", &form.email, form.focus == AuthField::Email, false));
    if form.mode == AuthMode::SignUp {
        let username_display = if form.username.is_empty() && form.focus != AuthField::Username {
            "(defaults to email name)".to_string()
        } else {
            form.username.clone()
        };
        lines.push(field_line(
            "Username",
            &username_display,
            form.focus == AuthField::Username,
            false,
        ));
    }
    lines.push(field_line(
        "Password",
        &form.password,
        form.focus == AuthField::Password,
        true,
    ));
    if form.mode == AuthMode::SignUp {
        lines.push(field_line(
            "Confirm",
            &form.confirm_password,
            form.focus == AuthField::ConfirmPassword,
            true,
        ));
    }

    if form.pending {
        lines.push(Line::from(""));
        let verb = match form.mode {
            AuthMode::SignIn => "Signing in...",
            AuthMode::SignUp => "Creating account...",
        };
        lines.push(Line::from(Span::styled(format!("  {}", verb), styles::success_style())));
    } else if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    lines.push(Line::from(""));
    let switch_hint = match form.mode {
        AuthMode::SignIn => "[ctrl+n] sign up",
        AuthMode::SignUp => "[ctrl+n] sign in",
    };
    lines.push(Line::from(Span::styled(
        format!("  [enter] submit  [tab] next  {}  [esc] close", switch_hint),
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" foo-rum ")
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw("  Quit foorum? [y]es / [n]o")),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(label: &str, value: &str, focused: bool, mask: bool) -> Line<'static> {
    let marker = if focused { "▸ " } else { "  " };
    let display = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "_" } else { "" };

    Line::from(vec![
        Span::styled(marker.to_string(), styles::field_style(focused)),
        Span::styled(format!("{:<10}", format!("{}:", label)), styles::field_style(focused)),
        Span::raw(format!("{}{}", display, cursor)),
    ])
}

/// A fixed-size rect centered inside `area`
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
