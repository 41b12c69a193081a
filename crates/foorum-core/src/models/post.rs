use serde::{Deserialize, Serialize};

/// A feed entry as persisted under the `posts` key.
///
/// `id` is derived from `created_at` (milliseconds since epoch, rendered as a
/// decimal string), so ids sort the same way creation times do. Engagement
/// counters are written as zero at creation and never mutated by the feed
/// store; live counts are presentation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub like_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape_is_camel_case() {
        let post = Post {
            id: "1700000000000".to_string(),
            author_id: "demo".to_string(),
            author_name: "Demo User".to_string(),
            author_avatar: None,
            body: "hello".to_string(),
            emoji: Some("🤞".to_string()),
            created_at: 1_700_000_000_000,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
        };

        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("authorId").is_some());
        assert!(json.get("authorName").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("likeCount").is_some());
        // Absent avatar is omitted entirely
        assert!(json.get("authorAvatar").is_none());
    }
}
