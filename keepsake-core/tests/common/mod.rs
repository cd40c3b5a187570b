//! In-memory journal server shared by the integration tests.
//!
//! Behaves like the real API closely enough for pagination: the feed is served
//! newest-first by `lastId`, comments are paged by offset with new top-level
//! comments inserted at the front, and every call is counted.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use keepsake_core::api::{CommentQuery, FeedQuery, JournalApi, SearchQuery, SuggestQuery};
use keepsake_core::types::{
    Author, CommentNode, CommentPage, FeedItem, NewComment, PageInfo, SearchHit, SearchPage,
    Suggestion, Visibility,
};
use keepsake_core::{Error, Result};

pub fn author(id: i64) -> Author {
    Author { id, nickname: format!("user{id}"), profile_image_url: None }
}

pub fn memory(id: i64) -> FeedItem {
    FeedItem {
        id,
        author: author(1),
        title: format!("memory {id}"),
        body: String::new(),
        media: Vec::new(),
        tags: vec!["trip".to_owned()],
        comment_count: 0,
        visibility: Visibility::Public,
        memory_date: None,
    }
}

pub fn comment(id: i64, depth: u8) -> CommentNode {
    CommentNode {
        id,
        author: author(2),
        body: format!("comment {id}"),
        created_at: "2024-05-01T12:00:00".to_owned(),
        depth,
        children_count: 0,
        children: Vec::new(),
    }
}

pub fn status_error() -> Error {
    Error::Status { code: 500, message: "boom".to_owned() }
}

#[derive(Default)]
pub struct FakeApi {
    /// Whole feed, newest (highest id) first.
    pub feed: Mutex<Vec<FeedItem>>,
    /// Scripted feed responses; when empty, pages are cut from `feed`.
    pub feed_script: Mutex<VecDeque<Result<Vec<FeedItem>>>>,
    pub feed_calls: AtomicUsize,
    pub feed_queries: Mutex<Vec<FeedQuery>>,

    pub search_total: Mutex<u64>,
    pub search_fail: Mutex<bool>,
    pub search_calls: AtomicUsize,

    pub suggestions: Mutex<Vec<Suggestion>>,
    pub suggest_calls: AtomicUsize,

    /// Top-level comments, newest first, replies embedded.
    pub comments: Mutex<Vec<CommentNode>>,
    pub comment_fail: Mutex<bool>,
    pub comment_calls: AtomicUsize,
    pub next_comment_id: Mutex<i64>,
}

impl FakeApi {
    pub fn with_feed(count: i64) -> Self {
        let api = Self::default();
        *api.feed.lock().unwrap() = (1..=count).rev().map(memory).collect();
        api
    }

    pub fn with_search_total(total: u64) -> Self {
        let api = Self::default();
        *api.search_total.lock().unwrap() = total;
        api
    }

    pub fn with_comments(comments: Vec<CommentNode>) -> Self {
        let api = Self::default();
        *api.next_comment_id.lock().unwrap() = 1000;
        *api.comments.lock().unwrap() = comments;
        api
    }

    pub fn script_feed(&self, response: Result<Vec<FeedItem>>) {
        self.feed_script.lock().unwrap().push_back(response);
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    pub fn comment_calls(&self) -> usize {
        self.comment_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn serve_feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        self.feed_queries.lock().unwrap().push(query.clone());
        if let Some(scripted) = self.feed_script.lock().unwrap().pop_front() {
            return scripted;
        }
        let feed = self.feed.lock().unwrap();
        Ok(feed
            .iter()
            .filter(|item| query.last_id.map_or(true, |last| item.id < last))
            .take(query.size as usize)
            .cloned()
            .collect())
    }

    pub fn serve_comments(&self, query: &CommentQuery) -> Result<CommentPage> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        if *self.comment_fail.lock().unwrap() {
            return Err(status_error());
        }
        let comments = self.comments.lock().unwrap();
        let start = (query.page * query.size) as usize;
        let page: Vec<CommentNode> =
            comments.iter().skip(start).take(query.size as usize).cloned().collect();
        let total: u64 = comments.iter().map(|c| 1 + c.children.len() as u64).sum();
        Ok(CommentPage {
            has_next: start + page.len() < comments.len(),
            comments: page,
            total_count: total,
            current_page: query.page,
        })
    }
}

impl JournalApi for FakeApi {
    async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>> {
        self.serve_feed(query)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if *self.search_fail.lock().unwrap() {
            return Err(status_error());
        }
        let total = *self.search_total.lock().unwrap();
        let size = u64::from(query.size);
        let total_pages = total.div_ceil(size) as u32;
        let start = u64::from(query.page) * size;
        let results = (start..total.min(start + size))
            .map(|n| SearchHit {
                id: n as i64,
                title: format!("{} #{n}", query.query),
                highlight: None,
                tags: Vec::new(),
                score: 1.0,
            })
            .collect();
        Ok(SearchPage {
            results,
            page_info: PageInfo {
                current_page: query.page,
                total_pages,
                page_size: query.size,
                total_elements: total,
                has_next: query.page + 1 < total_pages,
                has_previous: query.page > 0,
            },
            metadata: serde_json::Value::Null,
        })
    }

    async fn autocomplete(&self, _query: &SuggestQuery) -> Result<Vec<Suggestion>> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.suggestions.lock().unwrap().clone())
    }

    async fn comments(&self, query: &CommentQuery) -> Result<CommentPage> {
        self.serve_comments(query)
    }

    async fn create_comment(&self, new: &NewComment) -> Result<CommentNode> {
        let id = {
            let mut next = self.next_comment_id.lock().unwrap();
            *next += 1;
            *next
        };
        let mut comments = self.comments.lock().unwrap();
        match new.parent_comment_id {
            None => {
                let mut node = comment(id, 0);
                node.body = new.content.clone();
                comments.insert(0, node.clone());
                Ok(node)
            }
            Some(parent) => {
                let mut node = comment(id, 1);
                node.body = new.content.clone();
                let parent_node = comments
                    .iter_mut()
                    .find(|c| c.id == parent)
                    .ok_or(Error::Status { code: 404, message: "no such comment".to_owned() })?;
                parent_node.children.push(node.clone());
                parent_node.children_count += 1;
                Ok(node)
            }
        }
    }
}
