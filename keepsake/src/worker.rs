//! Background dispatch of API requests.
//!
//! Each admitted [`Request`] is spawned onto the tokio runtime, raced against its
//! cancellation token with [`bind`], and its result sent back over the event bus
//! as an [`AppEvent::Api`]. The state machines in `keepsake-core` decide what to
//! do with it; nothing here touches application state.
//!
//! A request whose scope was cancelled reports nothing at all: the screen that
//! issued it is gone.

use std::sync::Arc;

use keepsake_core::api::{CommentQuery, FeedQuery, HttpApi, JournalApi, SearchQuery, SuggestQuery};
use keepsake_core::slot::{bind, Request};
use keepsake_core::types::NewComment;
use keepsake_core::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::event::{ApiEvent, AppEvent};

/// Cheap to clone; every clone shares the same HTTP client.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<HttpApi>,
    tx: UnboundedSender<AppEvent>,
}

impl Dispatcher {
    pub fn new(api: HttpApi, tx: UnboundedSender<AppEvent>) -> Self {
        Self { api: Arc::new(api), tx }
    }

    pub fn feed(&self, request: Request<FeedQuery>) {
        let (api, tx) = (Arc::clone(&self.api), self.tx.clone());
        tokio::spawn(async move {
            let result = bind(&request.token, api.feed(&request.query)).await;
            deliver(&tx, result, |result| ApiEvent::Feed { ticket: request.ticket, result });
        });
    }

    pub fn search(&self, request: Request<SearchQuery>) {
        let (api, tx) = (Arc::clone(&self.api), self.tx.clone());
        tokio::spawn(async move {
            let result = bind(&request.token, api.search(&request.query)).await;
            deliver(&tx, result, |result| ApiEvent::Search { ticket: request.ticket, result });
        });
    }

    pub fn autocomplete(&self, request: Request<SuggestQuery>) {
        let (api, tx) = (Arc::clone(&self.api), self.tx.clone());
        tokio::spawn(async move {
            let result = bind(&request.token, api.autocomplete(&request.query)).await;
            deliver(&tx, result, |result| ApiEvent::Suggest {
                ticket: request.ticket,
                query: request.query.query,
                result,
            });
        });
    }

    pub fn comments(&self, request: Request<CommentQuery>) {
        let (api, tx) = (Arc::clone(&self.api), self.tx.clone());
        tokio::spawn(async move {
            let result = bind(&request.token, api.comments(&request.query)).await;
            deliver(&tx, result, |result| ApiEvent::Comments {
                content_id: request.query.content_id,
                ticket: request.ticket,
                result,
            });
        });
    }

    pub fn create_comment(&self, request: Request<NewComment>) {
        let (api, tx) = (Arc::clone(&self.api), self.tx.clone());
        tokio::spawn(async move {
            let result = bind(&request.token, api.create_comment(&request.query)).await;
            deliver(&tx, result, |result| ApiEvent::Created {
                content_id: request.query.content_id,
                parent: request.query.parent_comment_id,
                result,
            });
        });
    }
}

fn deliver<T>(tx: &UnboundedSender<AppEvent>, result: Result<T>, wrap: impl FnOnce(Result<T>) -> ApiEvent) {
    if matches!(&result, Err(e) if e.is_cancelled()) {
        trace!("request cancelled; dropping result");
        return;
    }
    // The receiver is gone only during shutdown.
    let _ = tx.send(AppEvent::Api(Box::new(wrap(result))));
}
