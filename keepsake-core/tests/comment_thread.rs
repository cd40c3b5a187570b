//! Integration tests for the two-level comment thread.
//!
//! Exercises: expand / open, complete_page, load_more, collapse, compose,
//! compose_reply, submit, apply_created.

mod common;

use common::{comment, FakeApi};
use keepsake_core::comments::{CommentThread, CreatedOutcome, PageOutcome, ThreadPhase};
use keepsake_core::slot::Scope;
use keepsake_core::types::CommentPage;
use keepsake_core::Error;

const MEMORY: i64 = 42;

fn ids(thread: &CommentThread) -> Vec<i64> {
    thread.comments().iter().map(|c| c.id).collect()
}

fn with_reply(id: i64, reply: i64) -> keepsake_core::types::CommentNode {
    let mut node = comment(id, 0);
    node.children.push(comment(reply, 1));
    node.children_count = 1;
    node
}

#[tokio::test]
async fn new_comments_and_replies_land_in_place() {
    let api = FakeApi::with_comments(Vec::new());
    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());
    assert_eq!(thread.open(&api).await, PageOutcome::Applied);
    assert_eq!(thread.total_count(), 0);

    let c1 = thread.compose("first!");
    assert_eq!(thread.submit(&api, c1).await.unwrap(), CreatedOutcome::Prepended);
    let reply = thread.compose_reply(1001, "agreed").unwrap();
    assert_eq!(thread.submit(&api, reply).await.unwrap(), CreatedOutcome::Appended { parent: 1001 });
    let c2 = thread.compose("  second  ");
    assert_eq!(c2.content, "second");
    thread.submit(&api, c2).await.unwrap();

    assert_eq!(ids(&thread), vec![1003, 1001], "newest top-level comment first");
    assert_eq!(thread.total_count(), 3);
    let parent = thread.find(1001).unwrap();
    assert_eq!(parent.children.len(), 1);
    assert_eq!(parent.children[0].id, 1002);
    assert_eq!(parent.children[0].depth, 1);
    assert_eq!(parent.children_count, 1);

    // A fresh page 0 shows the same thing.
    assert_eq!(thread.refresh(&api).await, PageOutcome::Applied);
    assert_eq!(ids(&thread), vec![1003, 1001]);
    assert_eq!(thread.total_count(), 3);
    assert_eq!(thread.find(1001).unwrap().children.len(), 1);
}

#[tokio::test]
async fn page_zero_replaces_and_is_idempotent() {
    let api = FakeApi::with_comments(vec![with_reply(10, 11), comment(9, 0), comment(8, 0)]);
    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());

    thread.open(&api).await;
    let first = thread.comments().to_vec();
    thread.refresh(&api).await;
    thread.refresh(&api).await;

    assert_eq!(thread.comments(), first.as_slice(), "reloads never duplicate");
    assert_eq!(thread.total_count(), 4);
    assert_eq!(thread.phase(), ThreadPhase::Loaded);
    assert!(!thread.has_next());
}

#[tokio::test]
async fn later_pages_append_without_duplicates() {
    let api = FakeApi::with_comments((1..=5).rev().map(|id| comment(id, 0)).collect());
    let mut thread = CommentThread::new(MEMORY, 2, Scope::new());

    thread.open(&api).await;
    assert_eq!(ids(&thread), vec![5, 4]);
    assert!(thread.has_next());

    thread.fetch_more(&api).await;
    assert_eq!(ids(&thread), vec![5, 4, 3, 2]);
    assert_eq!(thread.current_page(), 1);

    // Someone else's comment shifts the server's offsets by one.
    api.comments.lock().unwrap().insert(0, comment(6, 0));
    thread.fetch_more(&api).await;
    assert_eq!(ids(&thread), vec![5, 4, 3, 2, 1], "repeated tail is skipped");
    assert!(!thread.has_next());

    assert_eq!(thread.fetch_more(&api).await, PageOutcome::Stale, "nothing left to load");
    assert_eq!(api.comment_calls(), 3);
}

#[tokio::test]
async fn replies_to_replies_are_rejected() {
    let api = FakeApi::with_comments(vec![with_reply(10, 11)]);
    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());
    thread.open(&api).await;

    let err = thread.compose_reply(11, "nested").unwrap_err();
    assert!(matches!(err, Error::NotReplyable(11)));
    assert!(thread.compose_reply(10, "flat").is_ok());
}

#[tokio::test]
async fn reply_to_unloaded_parent_is_not_shown() {
    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());
    let request = thread.expand().unwrap();
    thread.complete_page(
        request.ticket,
        Ok(CommentPage { comments: vec![comment(10, 0)], total_count: 5, current_page: 0, has_next: true }),
    );

    let outcome = thread.apply_created(Some(3), comment(77, 1));
    assert_eq!(outcome, CreatedOutcome::ParentNotLoaded { parent: 3 });
    assert_eq!(thread.total_count(), 5, "count unchanged");
    assert!(thread.find(77).is_none());
}

#[tokio::test]
async fn collapse_discards_everything() {
    let api = FakeApi::with_comments(vec![with_reply(10, 11), comment(9, 0)]);
    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());
    thread.open(&api).await;

    let in_flight = thread.reload().unwrap();
    thread.collapse();
    assert!(in_flight.token.is_cancelled());
    assert_eq!(thread.phase(), ThreadPhase::Collapsed);
    assert!(thread.comments().is_empty());
    assert_eq!(thread.total_count(), 0);

    let late = api.serve_comments(&in_flight.query);
    assert_eq!(thread.complete_page(in_flight.ticket, late), PageOutcome::Stale);
    assert_eq!(thread.apply_created(None, comment(12, 0)), CreatedOutcome::Discarded);
    assert!(thread.comments().is_empty());

    // Expanding again starts from page 0.
    thread.open(&api).await;
    assert_eq!(ids(&thread), vec![10, 9]);
}

#[tokio::test]
async fn failed_first_load_returns_to_collapsed() {
    let api = FakeApi::with_comments(vec![comment(1, 0)]);
    *api.comment_fail.lock().unwrap() = true;
    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());

    assert_eq!(thread.open(&api).await, PageOutcome::Failed);
    assert_eq!(thread.phase(), ThreadPhase::Collapsed);

    *api.comment_fail.lock().unwrap() = false;
    assert_eq!(thread.open(&api).await, PageOutcome::Applied);
    assert_eq!(ids(&thread), vec![1]);
}

#[tokio::test]
async fn failed_later_page_keeps_what_is_loaded() {
    let api = FakeApi::with_comments((1..=4).rev().map(|id| comment(id, 0)).collect());
    let mut thread = CommentThread::new(MEMORY, 2, Scope::new());
    thread.open(&api).await;

    *api.comment_fail.lock().unwrap() = true;
    assert_eq!(thread.fetch_more(&api).await, PageOutcome::Failed);
    assert_eq!(thread.phase(), ThreadPhase::Loaded);
    assert_eq!(ids(&thread), vec![4, 3]);
    assert!(thread.has_next(), "retry is still offered");
}

#[tokio::test]
async fn deeper_server_nesting_is_flattened_to_two_levels() {
    let mut nested = comment(11, 1);
    nested.children.push(comment(12, 2));
    let mut root = comment(10, 0);
    root.children.push(nested);

    let mut thread = CommentThread::new(MEMORY, 10, Scope::new());
    let request = thread.expand().unwrap();
    thread.complete_page(
        request.ticket,
        Ok(CommentPage { comments: vec![root], total_count: 3, current_page: 0, has_next: false }),
    );

    let reply = &thread.comments()[0].children[0];
    assert_eq!(reply.depth, 1);
    assert!(reply.children.is_empty());
}
