//! Authenticated API client and the typed endpoint wrappers built on it.

mod client;
mod posts;

pub use client::ApiClient;
pub use posts::{ListPostsQuery, PostsApi};
