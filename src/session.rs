//! # Session Module
//!
//! The session context ties the engine together for one portal visit: it
//! owns the catalog handle, the selection ledger, the search/add mode
//! controller and the cached aggregate. A session is created on portal
//! entry and torn down on logout; nothing here is global or persistent.
//!
//! The mutation methods form a rendering-agnostic command interface: a web
//! page, a CLI or a test harness drive the engine through the same calls.
//! Every ledger mutation synchronously recomputes the aggregate. Only the
//! catalog boundary can fail, and a failed lookup leaves the ledger, the
//! aggregate and the cached suggestions exactly as they were.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::cost_aggregation::{aggregate, AggregateResult};
use crate::measurement_units::Unit;
use crate::product_catalog::{CatalogAccessor, Product};
use crate::selection_ledger::{RowId, SelectionLedger, SelectionRow};
use crate::suggestion_mode::{ActionKind, ModeController, SuggestionState};

/// What invoking the action button produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Add mode: the top suggestion became a ledger row
    Added { row_id: RowId, product: Product },
    /// Search mode: the full ranked result list for the UI to render
    SearchResults(Vec<Product>),
}

/// One user's calculator session, from portal entry to logout.
pub struct Session<C: CatalogAccessor> {
    catalog: C,
    ledger: SelectionLedger,
    controller: ModeController,
    aggregate: AggregateResult,
    opened_at: DateTime<Utc>,
}

impl<C: CatalogAccessor> Session<C> {
    /// Open a fresh session over the given catalog.
    pub fn open(catalog: C) -> Self {
        log::info!("calculator session opened");
        Self {
            catalog,
            ledger: SelectionLedger::new(),
            controller: ModeController::new(),
            aggregate: AggregateResult::empty(),
            opened_at: Utc::now(),
        }
    }

    /// Append `product` to the selection. Returns the new row's id.
    pub fn add_selected(&mut self, product: &Product) -> RowId {
        let row_id = self.ledger.add(product);
        self.recompute();
        row_id
    }

    /// Set a row's quantity from a numeric value.
    pub fn set_quantity(&mut self, row_id: RowId, qty: f64) {
        self.ledger.set_quantity(row_id, qty);
        self.recompute();
    }

    /// Set a row's quantity from raw text input; bad input coerces to zero.
    pub fn set_quantity_input(&mut self, row_id: RowId, input: &str) {
        self.ledger.set_quantity_input(row_id, input);
        self.recompute();
    }

    /// Switch the unit a row's quantity is entered in (reinterpretation,
    /// never a rescale of the stored number).
    pub fn set_entry_unit(&mut self, row_id: RowId, unit: Unit) {
        self.ledger.set_entry_unit(row_id, unit);
        self.recompute();
    }

    /// Remove a row from the selection; unknown ids are ignored.
    pub fn remove_selected(&mut self, row_id: RowId) {
        self.ledger.remove(row_id);
        self.recompute();
    }

    /// Selection rows in insertion order.
    pub fn rows(&self) -> &[SelectionRow] {
        self.ledger.rows()
    }

    /// The aggregate for the current selection.
    pub fn aggregate(&self) -> AggregateResult {
        self.aggregate
    }

    /// What the action button currently does.
    pub fn action(&self) -> ActionKind {
        self.controller.action()
    }

    /// Refresh suggestions for `term` and return the resulting state.
    ///
    /// Called on every input change. A catalog failure is returned to the
    /// caller and leaves the previously cached suggestions in place; a
    /// response arriving after a newer one was applied is dropped and the
    /// fresher state is returned instead.
    pub async fn get_suggestion_state(&mut self, term: &str) -> Result<SuggestionState> {
        let token = self.controller.begin_query();
        let candidates = self.catalog.query_products(term).await?;
        self.controller.apply_response(token, candidates);
        Ok(self.controller.state().clone())
    }

    /// Invoke the action button.
    ///
    /// In add mode this adds the top cached suggestion and clears query
    /// state; otherwise it runs a full catalog search with `term` and
    /// returns the ranked results for rendering.
    pub async fn invoke_action(&mut self, term: &str) -> Result<ActionOutcome> {
        if let Some(product) = self.controller.take_first() {
            let row_id = self.ledger.add(&product);
            self.recompute();
            log::info!("added top suggestion {} to selection", product.id);
            return Ok(ActionOutcome::Added { row_id, product });
        }
        Ok(ActionOutcome::SearchResults(self.run_search(term).await?))
    }

    /// Run a full catalog search, independent of the suggestion cache.
    pub async fn run_search(&self, term: &str) -> Result<Vec<Product>> {
        self.catalog.query_products(term).await
    }

    /// Add a specific rendered suggestion, then clear the suggestion cache.
    ///
    /// Always adds exactly `product`, whatever the controller state.
    pub fn select_suggestion(&mut self, product: &Product) -> RowId {
        let row_id = self.ledger.add(product);
        self.controller.reset();
        self.recompute();
        row_id
    }

    /// Tear the session down.
    pub fn close(self) {
        let lifetime = Utc::now() - self.opened_at;
        log::info!(
            "calculator session closed after {}s with {} selected rows",
            lifetime.num_seconds(),
            self.ledger.len()
        );
    }

    fn recompute(&mut self) {
        self.aggregate = aggregate(self.ledger.rows());
    }
}
