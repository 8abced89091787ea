//! # Suggestion Mode Module
//!
//! A small state machine deciding what the single search/add action button
//! does. While the query is empty, or yields no matches, the button performs
//! a full catalog search; as soon as the query has at least one suggestion,
//! the button flips to "add the top suggestion".
//!
//! Catalog lookups are async and can complete out of order. The controller
//! issues a monotonically increasing [`QueryToken`] per lookup and drops any
//! response that is not newer than the last one applied, so a slow stale
//! response can never clobber fresher suggestions.

use serde::Serialize;

use crate::product_catalog::Product;

/// Maximum number of autocomplete candidates kept per query.
pub const MAX_SUGGESTIONS: usize = 8;

/// Candidates for the current query, replaced wholesale on every keystroke.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionState {
    /// Up to [`MAX_SUGGESTIONS`] products in catalog-relevance order
    pub candidates: Vec<Product>,
    /// Whether the action button currently adds the top candidate
    #[serde(rename = "addMode")]
    pub add_mode: bool,
}

/// What invoking the action button will do in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Run a full catalog search with the current query
    Search,
    /// Add the first cached suggestion, then clear query and cache
    AddFirst,
}

/// Ticket identifying one catalog lookup started by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryToken(u64);

/// The search/add mode controller.
#[derive(Debug, Default)]
pub struct ModeController {
    state: SuggestionState,
    issued: u64,
    applied: u64,
}

impl ModeController {
    /// Create a controller in the empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current suggestion state.
    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    /// What the action button performs right now.
    pub fn action(&self) -> ActionKind {
        if self.state.add_mode {
            ActionKind::AddFirst
        } else {
            ActionKind::Search
        }
    }

    /// Start a catalog lookup, returning the ticket its response must carry.
    pub fn begin_query(&mut self) -> QueryToken {
        self.issued += 1;
        QueryToken(self.issued)
    }

    /// Apply a completed lookup's results.
    ///
    /// Returns `false` (leaving the state untouched) when the token is stale,
    /// i.e. a newer response was already applied or the controller was reset
    /// while the lookup was in flight. Candidates beyond [`MAX_SUGGESTIONS`]
    /// are dropped; an empty result leaves the button in search mode.
    pub fn apply_response(&mut self, token: QueryToken, mut candidates: Vec<Product>) -> bool {
        if token.0 <= self.applied {
            log::debug!("dropping stale suggestion response {:?}", token);
            return false;
        }
        self.applied = token.0;
        candidates.truncate(MAX_SUGGESTIONS);
        let add_mode = !candidates.is_empty();
        self.state = SuggestionState {
            candidates,
            add_mode,
        };
        true
    }

    /// Take the top suggestion for adding, clearing the suggestion cache.
    ///
    /// Returns `None` outside add mode.
    pub fn take_first(&mut self) -> Option<Product> {
        if !self.state.add_mode {
            return None;
        }
        let first = self.state.candidates.first().cloned();
        self.reset();
        first
    }

    /// Clear the suggestion cache and return to the empty state.
    ///
    /// Also invalidates every lookup still in flight.
    pub fn reset(&mut self) {
        self.state = SuggestionState::default();
        self.applied = self.issued;
    }
}
