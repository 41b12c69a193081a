use chrono::Utc;

/// Format a post timestamp (ms since epoch) relative to now
pub fn time_ago(created_at_ms: i64) -> String {
    time_ago_at(created_at_ms, Utc::now().timestamp_millis())
}

fn time_ago_at(created_at_ms: i64, now_ms: i64) -> String {
    let seconds = (now_ms - created_at_ms).max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
    } else if hours > 0 {
        format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
    } else if minutes > 0 {
        format!("{} min{} ago", minutes, if minutes > 1 { "s" } else { "" })
    } else {
        "Just now".to_string()
    }
}

/// Up to two uppercase initials for the avatar badge
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE_MS: i64 = 60 * 1000;
    const HOUR_MS: i64 = 60 * MINUTE_MS;
    const DAY_MS: i64 = 24 * HOUR_MS;

    #[test]
    fn test_time_ago_just_now() {
        assert_eq!(time_ago_at(1000, 1000), "Just now");
        assert_eq!(time_ago_at(1000, 59_000), "Just now");
    }

    #[test]
    fn test_time_ago_minutes() {
        assert_eq!(time_ago_at(0, MINUTE_MS), "1 min ago");
        assert_eq!(time_ago_at(0, 5 * MINUTE_MS), "5 mins ago");
    }

    #[test]
    fn test_time_ago_hours_and_days() {
        assert_eq!(time_ago_at(0, HOUR_MS), "1 hour ago");
        assert_eq!(time_ago_at(0, 3 * HOUR_MS), "3 hours ago");
        assert_eq!(time_ago_at(0, DAY_MS), "1 day ago");
        assert_eq!(time_ago_at(0, 2 * DAY_MS), "2 days ago");
    }

    #[test]
    fn test_time_ago_clock_skew() {
        // Timestamps from the future render as "Just now"
        assert_eq!(time_ago_at(10_000, 0), "Just now");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Theresa Webb"), "TW");
        assert_eq!(initials("demo"), "D");
        assert_eq!(initials("John Ronald Reuel Tolkien"), "JR");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a longer string", 10), "a longe...");
        assert_eq!(truncate_string("abcdef", 3), "abc");
    }
}
