//! Search-as-you-type suggestions.
//!
//! Keystrokes go through a [`Debouncer`]; once the input settles, a single
//! autocomplete request is issued and its batch is collapsed by [`aggregate`].
//! Each batch fully replaces the previous one, and a response to anything but the
//! latest request is dropped.

use std::time::{Duration, Instant};

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::api::SuggestQuery;
use crate::error::Result;
use crate::slot::{Request, RequestSlot, Scope, Ticket};
use crate::types::{Suggestion, SuggestionType};

/// Delay after the last keystroke before querying.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// All suggestions sharing one text, merged.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSuggestion {
    pub text: String,
    /// Types in first-seen order, no duplicates.
    pub type_tags: Vec<SuggestionType>,
    pub total_match_count: u32,
    pub max_score: f64,
}

/// Collapses `suggestions` to one entry per text, sorted by descending best score.
///
/// Equal scores keep first-seen order.
pub fn aggregate(suggestions: &[Suggestion]) -> Vec<AggregatedSuggestion> {
    let mut by_text: IndexMap<&str, AggregatedSuggestion> = IndexMap::with_capacity(suggestions.len());

    for s in suggestions {
        match by_text.entry(s.text.as_str()) {
            Entry::Occupied(mut entry) => {
                let agg = entry.get_mut();
                if !agg.type_tags.contains(&s.type_tag) {
                    agg.type_tags.push(s.type_tag);
                }
                agg.total_match_count = agg.total_match_count.saturating_add(s.match_count);
                agg.max_score = agg.max_score.max(s.score);
            }
            Entry::Vacant(entry) => {
                entry.insert(AggregatedSuggestion {
                    text: s.text.clone(),
                    type_tags: vec![s.type_tag],
                    total_match_count: s.match_count,
                    max_score: s.score,
                });
            }
        }
    }

    let mut merged: Vec<AggregatedSuggestion> = by_text.into_values().collect();
    // sort_by is stable.
    merged.sort_by(|a, b| b.max_score.total_cmp(&a.max_score));
    merged
}

/// Trailing-edge debouncer driven by the caller's clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Records new input, restarting the delay.
    pub fn push(&mut self, input: impl Into<String>, now: Instant) {
        self.pending = Some((input.into(), now + self.delay));
    }

    /// Returns the settled input once its deadline has passed, exactly once.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(input, _)| input),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Autocomplete state for one search box.
#[derive(Debug)]
pub struct SuggestionBox {
    debouncer: Debouncer,
    limit: u32,
    slot: RequestSlot,
    scope: Scope,
    current: Vec<AggregatedSuggestion>,
    /// Query the current batch answers.
    answered: Option<String>,
}

impl SuggestionBox {
    pub fn new(limit: u32, scope: Scope) -> Self {
        Self {
            debouncer: Debouncer::default(),
            limit: limit.max(1),
            slot: RequestSlot::new(),
            scope,
            current: Vec::new(),
            answered: None,
        }
    }

    pub fn suggestions(&self) -> &[AggregatedSuggestion] {
        &self.current
    }

    pub fn answered_query(&self) -> Option<&str> {
        self.answered.as_deref()
    }

    /// Feeds the current contents of the search box.
    ///
    /// Blank input clears suggestions immediately and issues nothing.
    pub fn input(&mut self, text: &str, now: Instant) {
        let text = text.trim();
        if text.is_empty() {
            self.clear();
            return;
        }
        self.debouncer.push(text, now);
    }

    /// Issues the autocomplete request once input has settled.
    pub fn poll(&mut self, now: Instant) -> Option<Request<SuggestQuery>> {
        let query = self.debouncer.poll(now)?;
        if self.scope.is_cancelled() {
            return None;
        }
        Some(self.slot.supersede(&self.scope, SuggestQuery { query, limit: self.limit }))
    }

    /// Replaces the current batch with the aggregated response.
    ///
    /// Returns `false` when the completion was superseded or failed; failures
    /// keep the previous batch and are only logged.
    pub fn complete(&mut self, ticket: Ticket, query: &str, result: Result<Vec<Suggestion>>) -> bool {
        if !self.slot.finish(ticket) {
            debug!(query, "dropping suggestions for a superseded query");
            return false;
        }
        match result {
            Ok(batch) => {
                self.current = aggregate(&batch);
                self.answered = Some(query.to_owned());
                true
            }
            Err(e) if e.is_cancelled() => false,
            Err(e) => {
                warn!(error = %e, query, "autocomplete failed");
                false
            }
        }
    }

    /// Drops suggestions and any pending or in-flight request.
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.slot.reset();
        self.current.clear();
        self.answered = None;
    }
}
