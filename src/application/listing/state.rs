//! Per-list state transitioned by a closed set of events.
//!
//! # Design
//! - Every change goes through [`ListState::apply`]; the returned
//!   [`ListEffect`] tells the host which fetch to run, so the state can be
//!   driven and tested without any network or rendering layer.
//! - Each fetch carries the generation it was issued at. Only a fetch for
//!   the current generation may land; older responses are dropped.
//! - Optimistic patches are tagged with a [`PatchId`] and remember the rows
//!   they replaced, so a single failed patch can be rolled back without
//!   touching its neighbours. A successful fetch always wins and forgets
//!   every outstanding patch.

use std::str::FromStr;

use metrics::counter;
use tracing::{debug, warn};

use crate::{
    application::{
        error::ApiError,
        listing::{
            METRIC_FETCH_FAILED_TOTAL, METRIC_FETCH_STALE_DROPPED_TOTAL,
            selection::{SelectionScope, SelectionSet},
        },
        pagination::{ListQuery, Page, PageMarker, page_window, total_pages},
    },
    domain::entities::ListRow,
};

/// Correlation id of one optimistic patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(u64);

impl PatchId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What to do with the local rows when an action is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Drop every outstanding patch and reload the current query.
    #[default]
    Refetch,
    /// Restore only the rows the failed patch replaced.
    Rollback,
}

impl FromStr for ReconcileMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "refetch" => Ok(ReconcileMode::Refetch),
            "rollback" => Ok(ReconcileMode::Rollback),
            other => Err(format!("unknown reconcile mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Permission to run one fetch, stamped with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: ListQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    Page(u32),
    PageSize(u32),
    ToggleSort(String),
    ClearSort,
    Filter { name: String, value: Option<String> },
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Select(String),
    Deselect(String),
    Toggle(String),
    /// Add every row currently loaded.
    SelectVisible,
    Remove(Vec<String>),
    Clear,
}

/// Replacement for one loaded row; `next: None` removes it from the list.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate<R> {
    pub id: String,
    pub next: Option<R>,
}

#[derive(Debug, Clone)]
pub enum ListEvent<R: ListRow> {
    QueryChanged(QueryChange),
    Selection(SelectionChange),
    FetchSettled {
        ticket: FetchTicket,
        outcome: Result<Page<R>, ApiError>,
    },
    ActionDispatched {
        patch: PatchId,
        action: &'static str,
        updates: Vec<RowUpdate<R>>,
    },
    ActionSucceeded {
        patch: PatchId,
        refetch: bool,
    },
    ActionFailed {
        patch: PatchId,
        reconcile: ReconcileMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    None,
    Fetch(FetchTicket),
}

#[derive(Debug, Clone)]
struct RowSnapshot<R> {
    id: String,
    index: usize,
    row: R,
    removed: bool,
}

#[derive(Debug, Clone)]
struct PendingPatch<R> {
    id: PatchId,
    action: &'static str,
    snapshots: Vec<RowSnapshot<R>>,
}

#[derive(Debug, Clone)]
pub struct ListState<R: ListRow> {
    query: ListQuery,
    rows: Vec<R>,
    /// Row ids in the order the server returned them.
    loaded_order: Vec<String>,
    total: u64,
    selection: SelectionSet,
    scope: SelectionScope,
    status: LoadStatus,
    generation: u64,
    next_patch: u64,
    patches: Vec<PendingPatch<R>>,
    last_error: Option<String>,
}

impl<R: ListRow> ListState<R> {
    pub fn new(query: ListQuery, scope: SelectionScope) -> Self {
        Self {
            query,
            rows: Vec::new(),
            loaded_order: Vec::new(),
            total: 0,
            selection: SelectionSet::default(),
            scope,
            status: LoadStatus::Idle,
            generation: 0,
            next_patch: 0,
            patches: Vec::new(),
            last_error: None,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.row_id() == id)
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.row_id().to_string()).collect()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn scope(&self) -> SelectionScope {
        self.scope
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_patches(&self) -> Vec<PatchId> {
        self.patches.iter().map(|patch| patch.id).collect()
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.query.page_size())
    }

    pub fn page_window(&self) -> Vec<PageMarker> {
        page_window(self.query.page(), self.total_pages())
    }

    /// Reserve a correlation id for the next optimistic patch.
    pub fn allocate_patch(&mut self) -> PatchId {
        self.next_patch += 1;
        PatchId(self.next_patch)
    }

    /// Ticket for reloading the current query without changing it.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    pub fn apply(&mut self, event: ListEvent<R>) -> ListEffect {
        match event {
            ListEvent::QueryChanged(change) => {
                self.change_query(change);
                ListEffect::Fetch(self.begin_fetch())
            }
            ListEvent::Selection(change) => {
                self.change_selection(change);
                ListEffect::None
            }
            ListEvent::FetchSettled { ticket, outcome } => {
                self.settle_fetch(ticket, outcome);
                ListEffect::None
            }
            ListEvent::ActionDispatched {
                patch,
                action,
                updates,
            } => {
                self.apply_patch(patch, action, updates);
                ListEffect::None
            }
            ListEvent::ActionSucceeded { patch, refetch } => {
                self.patches.retain(|pending| pending.id != patch);
                if refetch {
                    ListEffect::Fetch(self.begin_fetch())
                } else {
                    ListEffect::None
                }
            }
            ListEvent::ActionFailed { patch, reconcile } => {
                self.rollback_patch(patch);
                match reconcile {
                    ReconcileMode::Rollback => ListEffect::None,
                    ReconcileMode::Refetch => {
                        self.patches.clear();
                        ListEffect::Fetch(self.begin_fetch())
                    }
                }
            }
        }
    }

    fn change_query(&mut self, change: QueryChange) {
        match change {
            QueryChange::Page(page) => {
                self.query.set_page(page);
                self.drop_page_selection();
            }
            QueryChange::PageSize(size) => {
                self.query.set_page_size(size);
                self.query.set_page(1);
                self.drop_page_selection();
            }
            QueryChange::ToggleSort(key) => {
                self.query.sort_mut().toggle(&key);
                self.query.set_page(1);
                self.drop_page_selection();
            }
            QueryChange::ClearSort => {
                self.query.sort_mut().clear();
                self.query.set_page(1);
                self.drop_page_selection();
            }
            QueryChange::Filter { name, value } => {
                if self.query.set_filter(&name, value.as_deref()) {
                    self.query.set_page(1);
                    self.selection.clear();
                }
            }
            QueryChange::Reload => {}
        }
    }

    fn drop_page_selection(&mut self) {
        if self.scope == SelectionScope::Page {
            self.selection.clear();
        }
    }

    fn change_selection(&mut self, change: SelectionChange) {
        match change {
            SelectionChange::Select(id) => self.selection.select(id),
            SelectionChange::Deselect(id) => self.selection.deselect(&id),
            SelectionChange::Toggle(id) => self.selection.toggle(&id),
            SelectionChange::SelectVisible => {
                let ids = self.visible_ids();
                self.selection.select_all(ids);
            }
            SelectionChange::Remove(ids) => {
                for id in &ids {
                    self.selection.deselect(id);
                }
            }
            SelectionChange::Clear => self.selection.clear(),
        }
    }

    fn settle_fetch(&mut self, ticket: FetchTicket, outcome: Result<Page<R>, ApiError>) {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Dropping superseded list response"
            );
            counter!(METRIC_FETCH_STALE_DROPPED_TOTAL).increment(1);
            return;
        }

        self.patches.clear();
        match outcome {
            Ok(page) => {
                self.loaded_order = page
                    .items
                    .iter()
                    .map(|row| row.row_id().to_string())
                    .collect();
                self.rows = page.items;
                self.total = page.total;
                self.status = LoadStatus::Ready;
                self.last_error = None;
            }
            Err(err) => {
                warn!(
                    error = %err,
                    page = ticket.query.page(),
                    generation = ticket.generation,
                    "List fetch failed; showing empty page"
                );
                counter!(METRIC_FETCH_FAILED_TOTAL).increment(1);
                self.rows.clear();
                self.loaded_order.clear();
                self.total = 0;
                self.status = LoadStatus::Failed;
                self.last_error = Some(err.to_string());
            }
        }
    }

    fn apply_patch(&mut self, patch: PatchId, action: &'static str, updates: Vec<RowUpdate<R>>) {
        let mut snapshots = Vec::with_capacity(updates.len());
        for update in updates {
            let Some(index) = self.rows.iter().position(|row| row.row_id() == update.id) else {
                continue;
            };
            match update.next {
                Some(next) => {
                    let previous = std::mem::replace(&mut self.rows[index], next);
                    snapshots.push(RowSnapshot {
                        id: update.id,
                        index,
                        row: previous,
                        removed: false,
                    });
                }
                None => {
                    let previous = self.rows.remove(index);
                    self.total = self.total.saturating_sub(1);
                    snapshots.push(RowSnapshot {
                        id: update.id,
                        index,
                        row: previous,
                        removed: true,
                    });
                }
            }
        }

        debug!(
            patch = patch.get(),
            action,
            rows = snapshots.len(),
            "Applied optimistic patch"
        );
        self.patches.push(PendingPatch {
            id: patch,
            action,
            snapshots,
        });
    }

    fn rollback_patch(&mut self, patch: PatchId) {
        let Some(position) = self.patches.iter().position(|pending| pending.id == patch) else {
            return;
        };
        let pending = self.patches.remove(position);
        debug!(
            patch = patch.get(),
            action = pending.action,
            rows = pending.snapshots.len(),
            "Rolling back optimistic patch"
        );

        for snapshot in pending.snapshots.into_iter().rev() {
            if snapshot.removed {
                let index = self.restore_index(&snapshot);
                self.rows.insert(index, snapshot.row);
                self.total += 1;
            } else if let Some(slot) = self
                .rows
                .iter_mut()
                .find(|row| row.row_id() == snapshot.id)
            {
                *slot = snapshot.row;
            }
        }
    }

    /// Where a removed row goes back: before the first remaining row that
    /// followed it in the loaded page. Patches may settle in any order, so
    /// the index captured at removal time is only a fallback.
    fn restore_index(&self, snapshot: &RowSnapshot<R>) -> usize {
        let rank_of = |id: &str| self.loaded_order.iter().position(|loaded| loaded == id);
        let Some(rank) = rank_of(&snapshot.id) else {
            return snapshot.index.min(self.rows.len());
        };
        self.rows
            .iter()
            .position(|row| rank_of(row.row_id()).is_some_and(|other| other > rank))
            .unwrap_or(self.rows.len())
    }
}
