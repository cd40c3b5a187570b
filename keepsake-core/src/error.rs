use crate::types::CommentId;

/// Every failure the synchronization layer can report.
///
/// Transport and status failures come from the API boundary; the remaining
/// variants are local refusals. None of them is fatal — callers degrade to
/// "nothing more loaded".
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response arrived but its envelope carried a non-200 `statusCode`.
    #[error("server returned status {code}: {message}")]
    Status { code: u16, message: String },
    /// The response body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The owning screen was torn down before the response arrived.
    #[error("request cancelled")]
    Cancelled,
    /// Replies are only offered on top-level comments.
    #[error("comment {0} does not accept replies")]
    NotReplyable(CommentId),
    /// Page navigation outside `0..total_pages`.
    #[error("page {page} is outside 0..{total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },
    /// The config file exists but could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True for failures caused by teardown rather than by the server.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
