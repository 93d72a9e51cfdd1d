//! Blog post types and slug generation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Visible only to its author.
    #[default]
    Draft,
    /// Publicly listed and readable.
    Published,
}

/// Post metadata as stored by the backend.
///
/// The HTML content itself lives in object storage keyed by slug and is
/// only present on the single-post endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// URL-safe identifier derived from the title; also the content key.
    pub slug: String,
    /// Post title.
    pub title: String,
    /// Owning user's id.
    pub author_id: String,
    /// Draft or published.
    pub status: PostStatus,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last-update timestamp (RFC 3339).
    pub updated_at: String,
    /// Publication timestamp, set when the post first goes public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Sanitized HTML content, present on single-post responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One page of a post listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostList {
    /// The posts on this page.
    pub posts: Vec<Post>,
    /// Opaque cursor for the next page, if any.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Body for `POST /posts`.
///
/// Content must already have been uploaded under `content_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Post title; the backend derives the slug from it.
    pub title: String,
    /// Object-storage key of the uploaded HTML content.
    pub content_key: String,
    /// Initial status, defaults to draft when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// Body for `PUT /posts/{slug}`; all fields optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New content key, when the content was re-uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_key: Option<String>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[^\w\s-]").expect("valid regex")
});
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[\s_-]+").expect("valid regex")
});

/// Generates a URL-safe slug from a post title.
///
/// Lowercases, strips everything but word characters, whitespace and
/// hyphens, then collapses separator runs into single hyphens.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(lowered.trim(), "");
    SEPARATORS
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugifies_titles() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & Serverless  "), "rust-serverless");
        assert_eq!(slugify("snake_case_title"), "snake-case-title");
        assert_eq!(slugify("--already--slugged--"), "already-slugged");
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("a   b\t_c - d"), "a-b-c-d");
    }

    #[test]
    fn slugify_of_punctuation_only_is_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn post_wire_format_is_camel_case() {
        let json = r#"{
            "slug": "hello-world",
            "title": "Hello World",
            "authorId": "user-1",
            "status": "published",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-02T00:00:00Z",
            "publishedAt": "2026-01-02T00:00:00Z"
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.author_id, "user-1");
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.content, None);
    }

    #[test]
    fn update_request_skips_unset_fields() {
        let body = UpdatePostRequest {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"published"}"#
        );
    }
}
