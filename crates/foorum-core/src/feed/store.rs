use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::{Post, UserProfile};
use crate::storage::{StorageBackend, StorageError, StorageExt};

/// Storage key for the post list
const POSTS_KEY: &str = "posts";

/// Seed posts are backdated by this much so they render with a plausible age
const SEED_AGE_MS: i64 = 5 * 60 * 1000;

const SEED_BODY: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim \
veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

/// Replaceable fixture content shown on first run.
fn seed_posts(now_ms: i64) -> Vec<Post> {
    let authors = [
        ("1", "Theresa Webb", "🥴"),
        ("2", "John Doe", "🤞"),
        ("3", "Jane Doe", "💀"),
    ];

    authors
        .iter()
        .map(|(id, name, emoji)| Post {
            id: id.to_string(),
            author_id: id.to_string(),
            author_name: name.to_string(),
            author_avatar: None,
            body: SEED_BODY.to_string(),
            emoji: Some(emoji.to_string()),
            created_at: now_ms - SEED_AGE_MS,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
        })
        .collect()
}

struct FeedState {
    posts: Vec<Post>,
    /// High-water mark for `created_at`, so posts landing in the same
    /// millisecond still get distinct, strictly ordered ids.
    last_created_ms: i64,
}

/// Owns the ordered post collection, newest first. New posts are prepended
/// and the full sequence is persisted on every mutation. There are no update
/// or delete operations; engagement counts on persisted posts stay zero.
pub struct FeedStore {
    storage: Arc<dyn StorageBackend>,
    state: Mutex<FeedState>,
}

impl FeedStore {
    /// Load the persisted feed, seeding the fixture set on first run. A
    /// malformed feed is treated like a first run and reseeded.
    pub fn load(storage: Arc<dyn StorageBackend>) -> Result<Self, StorageError> {
        let posts = match storage.get_json::<Vec<Post>>(POSTS_KEY) {
            Ok(Some(posts)) => posts,
            Ok(None) => {
                let seed = seed_posts(Utc::now().timestamp_millis());
                storage.set_json(POSTS_KEY, &seed)?;
                info!(count = seed.len(), "seeded feed with sample posts");
                seed
            }
            Err(StorageError::Malformed { key, source }) => {
                warn!(key, error = %source, "persisted feed is malformed, reseeding");
                let seed = seed_posts(Utc::now().timestamp_millis());
                storage.set_json(POSTS_KEY, &seed)?;
                seed
            }
            Err(e) => return Err(e),
        };

        let last_created_ms = posts.iter().map(|p| p.created_at).max().unwrap_or(0);
        Ok(Self {
            storage,
            state: Mutex::new(FeedState {
                posts,
                last_created_ms,
            }),
        })
    }

    /// The current feed, newest first.
    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().unwrap().posts.clone()
    }

    /// Create a post authored by `author` and prepend it to the feed.
    /// Returns `Ok(None)` when the trimmed body is empty.
    pub fn create_post(
        &self,
        author: &UserProfile,
        body: &str,
        emoji: Option<&str>,
    ) -> Result<Option<Post>, StorageError> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }

        let mut state = self.state.lock().unwrap();
        let created_at = Utc::now()
            .timestamp_millis()
            .max(state.last_created_ms + 1);

        let post = Post {
            id: created_at.to_string(),
            author_id: author.id.clone(),
            author_name: author.username.clone(),
            author_avatar: author.avatar.clone(),
            body: body.to_string(),
            emoji: emoji.map(str::to_string),
            created_at,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
        };

        state.posts.insert(0, post.clone());
        if let Err(e) = self.storage.set_json(POSTS_KEY, &state.posts) {
            // Keep memory and storage in agreement
            state.posts.remove(0);
            return Err(e);
        }
        state.last_created_ms = created_at;

        debug!(id = %post.id, author = %post.author_name, "created post");
        Ok(Some(post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn memory() -> Arc<dyn StorageBackend> {
        Arc::new(MemoryStorage::new())
    }

    fn author() -> UserProfile {
        UserProfile {
            id: "demo".to_string(),
            email: "demo@example.com".to_string(),
            username: "Demo User".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_fresh_storage_seeds_three_posts() {
        let storage = memory();
        let feed = FeedStore::load(Arc::clone(&storage)).unwrap();

        let posts = feed.posts();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].author_name, "Theresa Webb");
        assert_eq!(posts[1].author_name, "John Doe");
        assert_eq!(posts[2].author_name, "Jane Doe");
        assert!(posts.iter().all(|p| p.like_count == 0));

        // A second load returns the same three unchanged
        let reloaded = FeedStore::load(storage).unwrap();
        assert_eq!(reloaded.posts(), posts);
    }

    #[test]
    fn test_create_post_prepends_and_preserves_order() {
        let storage = memory();
        let feed = FeedStore::load(storage).unwrap();
        let before = feed.posts();

        let post = feed
            .create_post(&author(), "Hello from the feed", Some("🤞"))
            .unwrap()
            .unwrap();

        let after = feed.posts();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], post);
        assert_eq!(&after[1..], &before[..]);
        assert_eq!(post.author_id, "demo");
        assert_eq!(post.emoji.as_deref(), Some("🤞"));
    }

    #[test]
    fn test_successive_posts_have_distinct_ordered_ids() {
        let storage = memory();
        let feed = FeedStore::load(storage).unwrap();

        let first = feed.create_post(&author(), "first", None).unwrap().unwrap();
        let second = feed.create_post(&author(), "second", None).unwrap().unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.created_at > first.created_at);
        assert_eq!(second.id, second.created_at.to_string());
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let storage = memory();
        let feed = FeedStore::load(storage).unwrap();
        let before = feed.posts();

        assert!(feed.create_post(&author(), "", None).unwrap().is_none());
        assert!(feed.create_post(&author(), "   \n\t", None).unwrap().is_none());
        assert_eq!(feed.posts(), before);
    }

    #[test]
    fn test_body_is_trimmed() {
        let storage = memory();
        let feed = FeedStore::load(storage).unwrap();

        let post = feed
            .create_post(&author(), "  spaced out  ", None)
            .unwrap()
            .unwrap();
        assert_eq!(post.body, "spaced out");
    }

    #[test]
    fn test_feed_round_trips_through_storage() {
        let storage = memory();
        let feed = FeedStore::load(Arc::clone(&storage)).unwrap();
        feed.create_post(&author(), "persisted", Some("😊")).unwrap();
        let expected = feed.posts();

        let reloaded = FeedStore::load(storage).unwrap();
        assert_eq!(reloaded.posts(), expected);
    }

    #[test]
    fn test_malformed_feed_reseeds() {
        let storage = memory();
        storage.set(POSTS_KEY, "not json at all").unwrap();

        let feed = FeedStore::load(Arc::clone(&storage)).unwrap();
        assert_eq!(feed.posts().len(), 3);

        // The reseed was persisted
        let reloaded = FeedStore::load(storage).unwrap();
        assert_eq!(reloaded.posts(), feed.posts());
    }
}
