pub mod format;

pub use format::{initials, time_ago, truncate_string};
