//! Integration tests for the cursor-paginated feed and its visibility trigger.
//!
//! Exercises: begin_fetch, complete, fetch_next, has_more, dedup on append,
//! failure handling, VisibilityBridge::poll / trigger / rearm.

mod common;

use common::{memory, status_error, FakeApi};
use keepsake_core::api::{FeedQuery, JournalApi};
use keepsake_core::feed::{CursorFeed, FeedOutcome};
use keepsake_core::slot::{bind, Scope};
use keepsake_core::visibility::{LoadMore, Viewport, VisibilityBridge};
use keepsake_core::Error;

fn ids(feed: &CursorFeed) -> Vec<i64> {
    feed.items().iter().map(|i| i.id).collect()
}

#[tokio::test]
async fn short_page_ends_the_feed() {
    let api = FakeApi::with_feed(18);
    let mut feed = CursorFeed::new(5, Scope::new());

    for _ in 0..4 {
        let outcome = feed.fetch_next(&api).await;
        assert!(matches!(outcome, FeedOutcome::Appended { .. }), "got {outcome:?}");
    }
    assert_eq!(feed.len(), 18, "3 full pages + 3");
    assert!(!feed.has_more(), "a 3-item page ends a 5-item feed");

    // Fifth call must not touch the network.
    assert_eq!(feed.fetch_next(&api).await, FeedOutcome::Skipped);
    assert_eq!(api.feed_calls(), 4);
}

#[tokio::test]
async fn cursor_is_the_tail_id() {
    let api = FakeApi::with_feed(12);
    let mut feed = CursorFeed::new(5, Scope::new());

    feed.fetch_next(&api).await;
    feed.fetch_next(&api).await;

    let queries = api.feed_queries.lock().unwrap().clone();
    assert_eq!(queries[0], FeedQuery { size: 5, last_id: None }, "first page has no cursor");
    assert_eq!(queries[1], FeedQuery { size: 5, last_id: Some(8) });
    assert_eq!(ids(&feed), (3..=12).rev().collect::<Vec<_>>(), "append order = fetch order");
}

#[tokio::test]
async fn exact_multiple_needs_one_empty_page() {
    let api = FakeApi::with_feed(10);
    let mut feed = CursorFeed::new(5, Scope::new());

    feed.fetch_next(&api).await;
    feed.fetch_next(&api).await;
    assert!(feed.has_more(), "full pages never end the feed");

    assert_eq!(feed.fetch_next(&api).await, FeedOutcome::Appended { added: 0, skipped: 0 });
    assert!(!feed.has_more());
    assert_eq!(feed.len(), 10);
}

#[tokio::test]
async fn failure_leaves_state_untouched_and_retries() {
    let api = FakeApi::with_feed(20);
    let mut feed = CursorFeed::new(5, Scope::new());
    feed.fetch_next(&api).await;

    api.script_feed(Err(status_error()));
    assert_eq!(feed.fetch_next(&api).await, FeedOutcome::Failed);
    assert_eq!(feed.len(), 5);
    assert!(feed.has_more());
    assert!(!feed.is_loading(), "loading clears on failure");

    // Next attempt resumes from the same cursor.
    feed.fetch_next(&api).await;
    let queries = api.feed_queries.lock().unwrap().clone();
    assert_eq!(queries[1].last_id, Some(16));
    assert_eq!(queries[2].last_id, Some(16));
    assert_eq!(feed.len(), 10);
}

#[tokio::test]
async fn repeated_items_are_not_duplicated() {
    let api = FakeApi::with_feed(0);
    let mut feed = CursorFeed::new(3, Scope::new());

    api.script_feed(Ok(vec![memory(9), memory(8), memory(7)]));
    api.script_feed(Ok(vec![memory(7), memory(6), memory(5)]));
    feed.fetch_next(&api).await;

    assert_eq!(feed.fetch_next(&api).await, FeedOutcome::Appended { added: 2, skipped: 1 });
    assert_eq!(ids(&feed), vec![9, 8, 7, 6, 5]);
    assert!(feed.has_more(), "has_more follows the raw page length");
}

#[tokio::test]
async fn two_triggers_in_one_tick_issue_one_request() {
    let api = FakeApi::with_feed(30);
    let mut feed = CursorFeed::new(5, Scope::new());
    feed.fetch_next(&api).await;

    let bridge = VisibilityBridge::new();
    let first = bridge.trigger(&mut feed);
    let second = bridge.trigger(&mut feed);
    assert!(first.is_some());
    assert!(second.is_none(), "the slot admits one request at a time");
    assert!(!feed.can_load_more());

    let request = first.unwrap();
    let result = bind(&request.token, api.feed(&request.query)).await;
    feed.complete(request.ticket, result);
    assert_eq!(feed.len(), 10);
    assert_eq!(api.feed_calls(), 2);
}

#[tokio::test]
async fn bridge_waits_for_initial_load() {
    let api = FakeApi::with_feed(30);
    let mut feed = CursorFeed::new(5, Scope::new());
    let mut bridge = VisibilityBridge::new();

    // Empty list: the sentinel is on screen immediately, but the first page
    // belongs to the screen's own initial fetch.
    let empty = Viewport { offset: 0, height: 10, content_rows: 0, sentinel_rows: 1 };
    assert!(bridge.poll(empty, &mut feed).is_none());

    let initial = feed.begin_fetch().expect("initial fetch");
    let result = bind(&initial.token, api.feed(&initial.query)).await;
    feed.complete(initial.ticket, result);

    // Five rows fit, sentinel leaves view, then the user scrolls down to it.
    let scrolled_out = Viewport { offset: 0, height: 5, content_rows: 5, sentinel_rows: 1 };
    assert!(bridge.poll(scrolled_out, &mut feed).is_none());
    let at_bottom = Viewport { offset: 1, height: 5, content_rows: 5, sentinel_rows: 1 };
    let request = bridge.poll(at_bottom, &mut feed).expect("sentinel entry loads more");
    assert_eq!(request.query.last_id, Some(26));
}

#[tokio::test]
async fn transition_while_loading_does_not_fire() {
    let mut feed = CursorFeed::new(5, Scope::new());
    let mut bridge = VisibilityBridge::new();
    let initial = feed.begin_fetch().unwrap();
    feed.complete(initial.ticket, Ok((26..=30).rev().map(memory).collect()));

    let in_flight = feed.begin_fetch().unwrap();
    let at_bottom = Viewport { offset: 1, height: 5, content_rows: 5, sentinel_rows: 1 };
    assert!(bridge.poll(at_bottom, &mut feed).is_none(), "guard is false while loading");
    feed.complete(in_flight.ticket, Ok(Vec::new()));
    assert!(!feed.has_more());
}

#[tokio::test]
async fn cancelled_scope_drops_late_completion() {
    let scope = Scope::new();
    let mut feed = CursorFeed::new(5, scope.clone());
    let request = feed.begin_fetch().unwrap();

    scope.cancel();
    let result = bind(&request.token, async { Ok::<_, Error>(vec![memory(1)]) }).await;
    assert!(matches!(result, Err(ref e) if e.is_cancelled()));
    assert_eq!(feed.complete(request.ticket, result), FeedOutcome::Failed);
    assert!(feed.is_empty());
    assert!(feed.begin_fetch().is_none(), "a torn-down scope admits nothing");
}

#[tokio::test]
async fn stale_ticket_is_ignored() {
    let mut feed = CursorFeed::new(5, Scope::new());
    let old = feed.begin_fetch().unwrap();
    feed.cancel();
    let fresh = feed.begin_fetch().unwrap();

    assert_eq!(feed.complete(old.ticket, Ok(vec![memory(99)])), FeedOutcome::Stale);
    assert!(feed.is_loading(), "the fresh request still holds the slot");
    feed.complete(fresh.ticket, Ok(vec![memory(5)]));
    assert_eq!(ids(&feed), vec![5]);
}

#[tokio::test]
async fn trailing_repeat_still_advances_the_cursor() {
    let api = FakeApi::with_feed(0);
    let mut feed = CursorFeed::new(3, Scope::new());

    // 5 arrives early, then closes the next page as a repeat.
    api.script_feed(Ok(vec![memory(9), memory(8), memory(5)]));
    api.script_feed(Ok(vec![memory(7), memory(6), memory(5)]));
    api.script_feed(Ok(vec![memory(4), memory(3), memory(2)]));
    feed.fetch_next(&api).await;
    assert_eq!(feed.fetch_next(&api).await, FeedOutcome::Appended { added: 2, skipped: 1 });
    assert_eq!(feed.cursor(), Some(5), "cursor follows the raw page, not the last unique item");
    feed.fetch_next(&api).await;

    let queries = api.feed_queries.lock().unwrap().clone();
    let cursors: Vec<_> = queries.iter().map(|q| q.last_id).collect();
    assert_eq!(cursors, vec![None, Some(5), Some(5)]);
    assert_eq!(ids(&feed), vec![9, 8, 5, 7, 6, 4, 3, 2]);
}

/// Screen-sized feed: ten 2-row entries plus the sentinel fit in 30 rows, so
/// the list never scrolls and the sentinel never leaves the viewport.
fn fits_on_screen(feed: &CursorFeed) -> Viewport {
    Viewport { offset: 0, height: 30, content_rows: feed.len() * 2, sentinel_rows: 2 }
}

#[tokio::test]
async fn resting_sentinel_loads_after_each_page() {
    let api = FakeApi::with_feed(40);
    let mut feed = CursorFeed::new(10, Scope::new());
    let mut bridge = VisibilityBridge::new();

    // Sentinel is visible while the first page is still loading.
    let initial = feed.begin_fetch().unwrap();
    assert!(bridge.poll(fits_on_screen(&feed), &mut feed).is_none());
    let result = bind(&initial.token, api.feed(&initial.query)).await;
    assert!(matches!(feed.complete(initial.ticket, result), FeedOutcome::Appended { added: 10, .. }));

    // Without re-arming, a sentinel that never moved would not fire again.
    for _ in 0..5 {
        assert!(bridge.poll(fits_on_screen(&feed), &mut feed).is_none());
    }

    bridge.rearm();
    let request = bridge.poll(fits_on_screen(&feed), &mut feed).expect("resting sentinel loads the next page");
    assert_eq!(request.query.last_id, Some(31));
    let result = bind(&request.token, api.feed(&request.query)).await;
    feed.complete(request.ticket, result);
    assert_eq!(feed.len(), 20);
}

#[tokio::test]
async fn scrolling_again_retries_a_failed_first_page() {
    let api = FakeApi::with_feed(40);
    let mut feed = CursorFeed::new(10, Scope::new());
    let mut bridge = VisibilityBridge::new();

    let initial = feed.begin_fetch().unwrap();
    assert!(bridge.poll(fits_on_screen(&feed), &mut feed).is_none());
    assert_eq!(feed.complete(initial.ticket, Err(status_error())), FeedOutcome::Failed);
    assert!(feed.is_empty());
    assert!(!feed.is_initial_load());

    // The failure alone does not retry; the user's next scroll does.
    assert!(bridge.poll(fits_on_screen(&feed), &mut feed).is_none());
    bridge.rearm();
    let retry = bridge.poll(fits_on_screen(&feed), &mut feed).expect("scroll retries the first page");
    assert_eq!(retry.query.last_id, None);
    let result = bind(&retry.token, api.feed(&retry.query)).await;
    feed.complete(retry.ticket, result);
    assert_eq!(feed.len(), 10);
}
