//! Typed wrappers for the posts endpoints.

use serde::Serialize;
use writeflow_domain::{Acknowledgement, CreatePostRequest, Post, PostList, UpdatePostRequest};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Query parameters for the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    /// Filter by status; only meaningful on `/my/posts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Cursor from the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ListPostsQuery {
    fn into_path(self, base: &str) -> ApiResult<String> {
        let query =
            serde_urlencoded::to_string(&self).map_err(|e| ApiError::Decode(e.to_string()))?;
        if query.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{base}?{query}"))
        }
    }
}

/// Posts endpoints over the authenticated client.
#[derive(Clone)]
pub struct PostsApi {
    client: ApiClient,
}

impl PostsApi {
    /// Wraps an [`ApiClient`].
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists public published posts. No auth required.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the client.
    pub async fn list_public(&self, query: ListPostsQuery) -> ApiResult<PostList> {
        self.client.get_public(&query.into_path("/posts")?).await
    }

    /// Lists the authenticated user's posts, drafts included.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the client.
    pub async fn list_mine(&self, query: ListPostsQuery) -> ApiResult<PostList> {
        self.client.get(&query.into_path("/my/posts")?).await
    }

    /// Fetches a post (with content) by slug; published posts only
    /// unless the caller owns the post.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`]; 404 for unknown slugs.
    pub async fn get(&self, slug: &str) -> ApiResult<Post> {
        self.client.get(&format!("/posts/{slug}")).await
    }

    /// Fetches one of the caller's own posts, drafts included.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the client.
    pub async fn get_mine(&self, slug: &str) -> ApiResult<Post> {
        self.client.get(&format!("/my/posts/{slug}")).await
    }

    /// Creates a post. Content must already be uploaded under the
    /// request's `content_key`.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the client.
    pub async fn create(&self, body: &CreatePostRequest) -> ApiResult<Post> {
        self.client.post("/posts", body).await
    }

    /// Updates a post the caller owns.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`]; 403 when the caller is not the owner.
    pub async fn update(&self, slug: &str, body: &UpdatePostRequest) -> ApiResult<Post> {
        self.client.put(&format!("/posts/{slug}"), body).await
    }

    /// Deletes a post the caller owns.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] from the client.
    pub async fn delete(&self, slug: &str) -> ApiResult<()> {
        let _ack: Acknowledgement = self.client.delete(&format!("/posts/{slug}")).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::Method;
    use crate::session::{RefreshCoordinator, SessionStore};
    use crate::testing::{ManualClock, MemoryStorage, ScriptedTransport, StubIdentity};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use writeflow_domain::AuthError;

    fn api(transport: Arc<ScriptedTransport>) -> PostsApi {
        let store = SessionStore::new(
            Arc::new(MemoryStorage::default()),
            Arc::new(ManualClock::new(Utc::now())),
        );
        let identity = Arc::new(StubIdentity::refreshing_err(AuthError::RefreshRejected(
            "unused".to_string(),
        )));
        let refresher = Arc::new(RefreshCoordinator::new(store.clone(), identity));
        PostsApi::new(ApiClient::new(transport, store, refresher))
    }

    #[test]
    fn listing_query_builds_the_path() {
        let query = ListPostsQuery {
            status: Some("draft".to_string()),
            limit: Some(10),
            next_token: None,
        };
        assert_eq!(
            query.into_path("/my/posts").unwrap(),
            "/my/posts?status=draft&limit=10"
        );

        assert_eq!(
            ListPostsQuery::default().into_path("/posts").unwrap(),
            "/posts"
        );
    }

    #[tokio::test]
    async fn list_public_hits_the_posts_endpoint_without_auth() {
        let transport = Arc::new(ScriptedTransport::replying(
            200,
            r#"{"success":true,"data":{"posts":[],"nextToken":null}}"#,
        ));
        let api = api(transport.clone());

        let page = api
            .list_public(ListPostsQuery {
                limit: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.next_token, None);

        let requests = transport.requests().await;
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/posts?limit=5");
    }

    #[tokio::test]
    async fn delete_accepts_a_bare_acknowledgement() {
        let transport = Arc::new(ScriptedTransport::replying(
            200,
            r#"{"success":true,"message":"Post deleted"}"#,
        ));
        let api = api(transport);

        api.delete("hello-world").await.unwrap();
    }

    #[tokio::test]
    async fn create_serializes_the_camel_case_body() {
        let transport = Arc::new(ScriptedTransport::replying(
            200,
            r#"{"success":true,"data":{
                "slug":"hello","title":"Hello","authorId":"u1",
                "status":"draft","createdAt":"2026-01-01T00:00:00Z",
                "updatedAt":"2026-01-01T00:00:00Z"
            }}"#,
        ));
        let api = api(transport.clone());

        let post = api
            .create(&CreatePostRequest {
                title: "Hello".to_string(),
                content_key: "posts/hello.html".to_string(),
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(post.slug, "hello");

        let body = transport.requests().await[0].body.clone().unwrap();
        assert_eq!(body["contentKey"], "posts/hello.html");
        assert_eq!(body.get("status"), None);
    }
}
