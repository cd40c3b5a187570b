//! Wire and domain types shared by the API client and the synchronization state.
//!
//! Field names follow the server's camelCase JSON. Every type is owned and `Send`
//! so responses can travel from a spawned request task back to the UI loop.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Memory identifier. Decreases with recency, so it doubles as the feed cursor.
pub type ItemId = i64;
pub type CommentId = i64;

/// Who may see a memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Relationship,
}

impl Visibility {
    pub fn label(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Relationship => "shared",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// One memory in a feed. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: ItemId,
    pub author: Author,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "content")]
    pub body: String,
    #[serde(default, rename = "imageUrls")]
    pub media: Vec<String>,
    #[serde(default, rename = "hashtags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub visibility: Visibility,
    /// Calendar date the memory is about (`YYYY-MM-DD`), not its creation time.
    #[serde(default)]
    pub memory_date: Option<String>,
}

/// Page metadata returned with every search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    /// Body excerpt with matches wrapped in `<em>` by the server.
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default, rename = "hashtags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

/// One page of search results. Replaced wholesale on every navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<SearchHit>,
    pub page_info: PageInfo,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionType {
    Title,
    Hashtag,
}

/// Raw autocomplete record. The same text may arrive once per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub type_tag: SuggestionType,
    pub match_count: u32,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionBatch {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

/// A comment or a reply. `depth` is 0 for top-level comments and 1 for replies;
/// only depth-0 nodes carry children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: CommentId,
    pub author: Author,
    #[serde(rename = "content")]
    pub body: String,
    pub created_at: String,
    #[serde(default)]
    pub depth: u8,
    #[serde(default)]
    pub children_count: u32,
    #[serde(default)]
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }
}

/// One page of top-level comments, replies embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentNode>,
    pub total_count: u64,
    pub current_page: u32,
    pub has_next: bool,
}

/// Body of `POST /comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content_id: ItemId,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<CommentId>,
}

/// `{statusCode, message, data}` wrapper around every response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwraps `data`, treating any `statusCode != 200` as a domain failure even
    /// though the transport succeeded.
    pub fn into_data(self) -> Result<T> {
        if self.status_code != 200 {
            return Err(Error::Status { code: self.status_code, message: self.message });
        }
        self.data.ok_or_else(|| Error::Status {
            code: self.status_code,
            message: "response carried no data".to_owned(),
        })
    }
}
