//! Feed module: the ordered, persisted post collection.

pub mod store;

pub use store::FeedStore;
