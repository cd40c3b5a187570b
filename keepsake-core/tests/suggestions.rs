//! Integration tests for autocomplete aggregation and the suggestion box.
//!
//! Exercises: aggregate, Debouncer, SuggestionBox::input / poll / complete.

mod common;

use std::time::{Duration, Instant};

use common::{status_error, FakeApi};
use keepsake_core::api::JournalApi;
use keepsake_core::slot::{bind, Scope};
use keepsake_core::suggest::{aggregate, Debouncer, SuggestionBox, DEBOUNCE_DELAY};
use keepsake_core::types::{Suggestion, SuggestionType};

fn hit(text: &str, type_tag: SuggestionType, match_count: u32, score: f64) -> Suggestion {
    Suggestion { text: text.to_owned(), type_tag, match_count, score }
}

#[test]
fn same_text_is_merged_across_types() {
    let batch = vec![
        hit("seoul", SuggestionType::Title, 3, 0.9),
        hit("seoul", SuggestionType::Hashtag, 1, 0.95),
        hit("busan", SuggestionType::Title, 2, 0.5),
    ];
    let merged = aggregate(&batch);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "seoul");
    assert_eq!(merged[0].type_tags, vec![SuggestionType::Title, SuggestionType::Hashtag]);
    assert_eq!(merged[0].total_match_count, 4);
    assert_eq!(merged[0].max_score, 0.95);
    assert_eq!(merged[1].text, "busan");
    assert_eq!(merged[1].max_score, 0.5);
}

#[test]
fn ties_keep_first_seen_order() {
    let batch = vec![
        hit("jeju", SuggestionType::Hashtag, 1, 0.4),
        hit("gangneung", SuggestionType::Title, 1, 0.7),
        hit("incheon", SuggestionType::Title, 1, 0.4),
        hit("jeju", SuggestionType::Hashtag, 2, 0.1),
    ];
    let order: Vec<String> = aggregate(&batch).into_iter().map(|s| s.text).collect();
    assert_eq!(order, vec!["gangneung", "jeju", "incheon"]);

    let jeju = aggregate(&batch).into_iter().find(|s| s.text == "jeju").unwrap();
    assert_eq!(jeju.type_tags, vec![SuggestionType::Hashtag], "types are not repeated");
    assert_eq!(jeju.total_match_count, 3);
}

#[test]
fn empty_batch_aggregates_to_nothing() {
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn debouncer_fires_once_after_quiet_period() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(300));

    debouncer.push("se", start);
    debouncer.push("seo", start + Duration::from_millis(200));
    assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None, "timer restarted");
    assert_eq!(debouncer.poll(start + Duration::from_millis(500)), Some("seo".to_owned()));
    assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None, "fires exactly once");
    assert!(!debouncer.is_pending());
}

#[tokio::test]
async fn settled_input_issues_one_request() {
    let api = FakeApi::default();
    *api.suggestions.lock().unwrap() = vec![
        hit("seoul", SuggestionType::Title, 3, 0.9),
        hit("seoul", SuggestionType::Hashtag, 1, 0.95),
    ];
    let start = Instant::now();
    let mut suggest = SuggestionBox::new(8, Scope::new());

    suggest.input("s", start);
    suggest.input("se", start + Duration::from_millis(50));
    suggest.input("seo ", start + Duration::from_millis(100));
    assert!(suggest.poll(start + Duration::from_millis(200)).is_none());

    let request = suggest.poll(start + Duration::from_millis(100) + DEBOUNCE_DELAY).expect("settled");
    assert_eq!(request.query.query, "seo");
    assert_eq!(request.query.limit, 8);
    let result = bind(&request.token, api.autocomplete(&request.query)).await;
    assert!(suggest.complete(request.ticket, &request.query.query, result));

    assert_eq!(api.suggest_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(suggest.suggestions().len(), 1);
    assert_eq!(suggest.answered_query(), Some("seo"));
}

#[tokio::test]
async fn superseded_batch_is_dropped() {
    let start = Instant::now();
    let mut suggest = SuggestionBox::new(8, Scope::new());

    suggest.input("bu", start);
    let first = suggest.poll(start + DEBOUNCE_DELAY).unwrap();
    suggest.input("busan", start + DEBOUNCE_DELAY);
    let second = suggest.poll(start + DEBOUNCE_DELAY * 2).unwrap();
    assert!(first.token.is_cancelled());

    let fresh = vec![hit("busan", SuggestionType::Title, 2, 0.5)];
    assert!(suggest.complete(second.ticket, "busan", Ok(fresh)));
    let late = vec![hit("bukchon", SuggestionType::Hashtag, 9, 0.99)];
    assert!(!suggest.complete(first.ticket, "bu", Ok(late)));

    let texts: Vec<&str> = suggest.suggestions().iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["busan"]);
}

#[tokio::test]
async fn failure_keeps_previous_batch() {
    let start = Instant::now();
    let mut suggest = SuggestionBox::new(8, Scope::new());

    suggest.input("seoul", start);
    let first = suggest.poll(start + DEBOUNCE_DELAY).unwrap();
    suggest.complete(first.ticket, "seoul", Ok(vec![hit("seoul", SuggestionType::Title, 1, 0.9)]));

    suggest.input("seoul tower", start + DEBOUNCE_DELAY);
    let second = suggest.poll(start + DEBOUNCE_DELAY * 2).unwrap();
    assert!(!suggest.complete(second.ticket, "seoul tower", Err(status_error())));
    assert_eq!(suggest.suggestions().len(), 1);
    assert_eq!(suggest.answered_query(), Some("seoul"));
}

#[test]
fn blank_input_clears_without_a_request() {
    let start = Instant::now();
    let mut suggest = SuggestionBox::new(8, Scope::new());

    suggest.input("seoul", start);
    let pending = suggest.poll(start + DEBOUNCE_DELAY).unwrap();
    suggest.input("   ", start + DEBOUNCE_DELAY);

    assert!(pending.token.is_cancelled(), "in-flight request is abandoned");
    assert!(suggest.suggestions().is_empty());
    assert!(suggest.poll(start + DEBOUNCE_DELAY * 10).is_none());
    assert!(!suggest.complete(pending.ticket, "seoul", Ok(vec![hit("seoul", SuggestionType::Title, 1, 0.9)])));
}

#[test]
fn torn_down_scope_issues_nothing() {
    let start = Instant::now();
    let scope = Scope::new();
    let mut suggest = SuggestionBox::new(8, scope.clone());

    suggest.input("seoul", start);
    scope.cancel();
    assert!(suggest.poll(start + DEBOUNCE_DELAY).is_none());
}
