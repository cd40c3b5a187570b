//! The journal API as seen by the synchronization layer.
//!
//! [`JournalApi`] is the seam: paginators never talk HTTP themselves, they hand a
//! query to whatever implements this trait. [`HttpApi`] is the production
//! implementation over `reqwest`; tests supply an in-memory one.
//!
//! Every response is a `{statusCode, message, data}` envelope. A non-200
//! `statusCode` is a failure even when the HTTP exchange itself succeeded.

use std::future::Future;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{
    CommentNode, CommentPage, Envelope, FeedItem, ItemId, NewComment, SearchPage, Suggestion,
    SuggestionBatch,
};

/// `GET feed?size=N[&lastId=ID]`. No `last_id` means "first page".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub size: u32,
    pub last_id: Option<ItemId>,
}

/// Search request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub query: String,
    pub page: u32,
    pub size: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub highlight: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, page: u32, size: u32) -> Self {
        Self { query: query.into(), page, size, kind: "ALL", highlight: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestQuery {
    pub query: String,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    pub content_id: ItemId,
    pub page: u32,
    pub size: u32,
}

/// Which endpoint family to call. The caller decides; the paginators do not care.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    #[default]
    Authenticated,
    Public,
}

pub trait JournalApi: Send + Sync + 'static {
    fn feed(&self, query: &FeedQuery) -> impl Future<Output = Result<Vec<FeedItem>>> + Send;

    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchPage>> + Send;

    fn autocomplete(
        &self,
        query: &SuggestQuery,
    ) -> impl Future<Output = Result<Vec<Suggestion>>> + Send;

    fn comments(&self, query: &CommentQuery) -> impl Future<Output = Result<CommentPage>> + Send;

    fn create_comment(
        &self,
        comment: &NewComment,
    ) -> impl Future<Output = Result<CommentNode>> + Send;
}

/// `reqwest`-backed API client.
///
/// The bearer token is attached on authenticated calls only; acquiring and
/// refreshing it is someone else's job.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    access: Access,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>, access: Access) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client: Client::new(), base_url, token, access }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_url, config.token.clone(), config.access())
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Builds an absolute URL, inserting `/public` for unauthenticated calls.
    fn url(&self, path: &str) -> String {
        match self.access {
            Access::Authenticated => format!("{}/api{}", self.base_url, path),
            Access::Public => format!("{}/api/public{}", self.base_url, path),
        }
    }

    fn authorize(&self, req: RequestBuilder, access: Access) -> RequestBuilder {
        match (&self.token, access) {
            (Some(token), Access::Authenticated) => req.bearer_auth(token),
            _ => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        self.send_as(req, self.access).await
    }

    /// Sends `req` with the credentials `access` calls for and unwraps the envelope.
    async fn send_as<T: DeserializeOwned>(&self, req: RequestBuilder, access: Access) -> Result<T> {
        let response = self.authorize(req, access).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<Envelope<T>>(&bytes) {
            Ok(envelope) => envelope.into_data(),
            // Non-JSON error pages from proxies still deserve a status error.
            Err(_) if !status.is_success() => Err(Error::Status {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_owned(),
            }),
            Err(e) => {
                warn!(%status, "response body did not match the expected envelope");
                Err(e.into())
            }
        }
    }
}

impl JournalApi for HttpApi {
    async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>> {
        let url = self.url("/memories/feed");
        debug!(%url, size = query.size, last_id = ?query.last_id, "fetching feed page");
        let mut req = self.client.get(url).query(&[("size", query.size)]);
        if let Some(last_id) = query.last_id {
            req = req.query(&[("lastId", last_id)]);
        }
        self.send(req).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let url = self.url("/search");
        debug!(%url, query = %query.query, page = query.page, "searching");
        self.send(self.client.post(url).json(query)).await
    }

    async fn autocomplete(&self, query: &SuggestQuery) -> Result<Vec<Suggestion>> {
        let url = self.url("/search/autocomplete");
        let req = self
            .client
            .get(url)
            .query(&[("query", query.query.as_str())])
            .query(&[("limit", query.limit)]);
        let batch: SuggestionBatch = self.send(req).await?;
        Ok(batch.suggestions)
    }

    async fn comments(&self, query: &CommentQuery) -> Result<CommentPage> {
        let url = self.url(&format!("/comments/{}/top-level", query.content_id));
        debug!(%url, page = query.page, "fetching comment page");
        let req = self.client.get(url).query(&[("page", query.page), ("size", query.size)]);
        self.send(req).await
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<CommentNode> {
        // Writing always goes to the authenticated endpoint.
        let url = format!("{}/api/comments", self.base_url);
        debug!(content_id = comment.content_id, parent = ?comment.parent_comment_id, "posting comment");
        self.send_as(self.client.post(url).json(comment), Access::Authenticated).await
    }
}
