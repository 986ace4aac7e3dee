//! Bulk actions over the current selection.
//!
//! # Design
//! - The selection is the input; rows that are loaded are patched locally
//!   first, rows selected on other pages are only sent to the server.
//! - `AllOrNothing` reports one aggregate. Any failure refetches the list and
//!   keeps the selection so the operator can retry.
//! - `PerItem` settles every request. Accepted ids are committed and
//!   deselected; refused ids are rolled back and stay selected.

use std::{str::FromStr, sync::Arc};

use futures::future::{join_all, try_join_all};
use metrics::counter;
use tracing::{debug, info, warn};

use crate::{
    application::{
        error::{ApiError, AppError},
        listing::{
            fetcher::ListController,
            state::{ListEvent, ReconcileMode, RowUpdate, SelectionChange},
        },
        moderation::{METRIC_ACTION_FAILED_TOTAL, METRIC_ACTION_TOTAL, gate::Confirmed},
        repos::ActionSink,
    },
    domain::{
        entities::ListRow,
        moderation::{ActionContext, RowAction},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkMode {
    #[default]
    AllOrNothing,
    PerItem,
}

impl FromStr for BulkMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all_or_nothing" => Ok(BulkMode::AllOrNothing),
            "per_item" => Ok(BulkMode::PerItem),
            other => Err(format!("unknown bulk mode `{other}`")),
        }
    }
}

/// How the requests for one bulk action are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkStrategy {
    /// One request per id, all in flight together.
    #[default]
    FanOut,
    /// One request to the resource's bulk endpoint when it has one.
    Batched,
}

impl FromStr for BulkStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fan_out" => Ok(BulkStrategy::FanOut),
            "batched" => Ok(BulkStrategy::Batched),
            other => Err(format!("unknown bulk strategy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub id: String,
    pub error: ApiError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// Every id was accepted.
    Completed { ids: Vec<String> },
    /// At least one id was refused; nothing is reported per id.
    Failed { ids: Vec<String>, error: ApiError },
    /// Per-item settlement with at least one refusal.
    Partial {
        succeeded: Vec<String>,
        failed: Vec<ItemFailure>,
    },
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BulkOutcome::Completed { .. })
    }
}

pub struct BulkActionDispatcher<R: ListRow, A: RowAction<R>> {
    sink: Arc<dyn ActionSink<R, A>>,
    actor: String,
    mode: BulkMode,
    strategy: BulkStrategy,
}

impl<R: ListRow, A: RowAction<R>> BulkActionDispatcher<R, A> {
    pub fn new(sink: Arc<dyn ActionSink<R, A>>, actor: impl Into<String>) -> Self {
        Self {
            sink,
            actor: actor.into(),
            mode: BulkMode::default(),
            strategy: BulkStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: BulkMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: BulkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn mode(&self) -> BulkMode {
        self.mode
    }

    pub fn strategy(&self) -> BulkStrategy {
        self.strategy
    }

    /// Dispatch an action released by the confirmation gate.
    pub async fn dispatch_confirmed(
        &self,
        list: &mut ListController<R>,
        confirmed: Confirmed<A>,
    ) -> Result<BulkOutcome, AppError> {
        let Confirmed { mut action, reason } = confirmed;
        action.attach_reason(reason);
        self.dispatch(list, &action).await
    }

    /// Apply `action` to every selected id. An empty selection or an illegal
    /// transition on any loaded row rejects the whole batch before anything
    /// is sent.
    pub async fn dispatch(
        &self,
        list: &mut ListController<R>,
        action: &A,
    ) -> Result<BulkOutcome, AppError> {
        let ids = list.state().selection().ids();
        if ids.is_empty() {
            return Err(AppError::validation("no rows selected"));
        }

        let ctx = ActionContext::now(self.actor.as_str());
        let updates = self.plan(list, &ids, action, &ctx)?;

        counter!(METRIC_ACTION_TOTAL, "resource" => list.resource(), "action" => action.name())
            .increment(ids.len() as u64);
        info!(
            resource = list.resource(),
            action = action.name(),
            selected = ids.len(),
            mode = ?self.mode,
            strategy = ?self.strategy,
            "Dispatching bulk action"
        );

        match self.mode {
            BulkMode::AllOrNothing => self.all_or_nothing(list, ids, updates, action).await,
            BulkMode::PerItem => Ok(self.per_item(list, ids, updates, action).await),
        }
    }

    fn plan(
        &self,
        list: &ListController<R>,
        ids: &[String],
        action: &A,
        ctx: &ActionContext,
    ) -> Result<Vec<RowUpdate<R>>, AppError> {
        let mut updates = Vec::new();
        for id in ids {
            if let Some(row) = list.state().row(id) {
                updates.push(RowUpdate {
                    id: id.clone(),
                    next: action.apply(row, ctx)?,
                });
            }
        }
        Ok(updates)
    }

    async fn all_or_nothing(
        &self,
        list: &mut ListController<R>,
        ids: Vec<String>,
        updates: Vec<RowUpdate<R>>,
        action: &A,
    ) -> Result<BulkOutcome, AppError> {
        let patch = list.allocate_patch();
        list.apply(ListEvent::ActionDispatched {
            patch,
            action: action.name(),
            updates,
        });

        match self.send_all(&ids, action).await {
            Ok(()) => {
                list.apply(ListEvent::Selection(SelectionChange::Clear));
                list.dispatch(ListEvent::ActionSucceeded {
                    patch,
                    refetch: true,
                })
                .await;
                Ok(BulkOutcome::Completed { ids })
            }
            Err(error) => {
                warn!(
                    resource = list.resource(),
                    action = action.name(),
                    selected = ids.len(),
                    error = %error,
                    "Bulk action failed; refetching list"
                );
                counter!(
                    METRIC_ACTION_FAILED_TOTAL,
                    "resource" => list.resource(),
                    "action" => action.name()
                )
                .increment(1);
                list.dispatch(ListEvent::ActionFailed {
                    patch,
                    reconcile: ReconcileMode::Refetch,
                })
                .await;
                Ok(BulkOutcome::Failed { ids, error })
            }
        }
    }

    async fn send_all(&self, ids: &[String], action: &A) -> Result<(), ApiError> {
        if self.strategy == BulkStrategy::Batched {
            match self.sink.perform_batch(ids, action).await {
                Err(ApiError::Unsupported(name)) => {
                    debug!(action = name, "No bulk endpoint; sending one request per id");
                }
                other => return other,
            }
        }

        try_join_all(ids.iter().map(|id| self.sink.perform(id, action)))
            .await
            .map(|_| ())
    }

    async fn per_item(
        &self,
        list: &mut ListController<R>,
        ids: Vec<String>,
        updates: Vec<RowUpdate<R>>,
        action: &A,
    ) -> BulkOutcome {
        if self.strategy == BulkStrategy::Batched {
            debug!(
                action = action.name(),
                "Per-item settlement sends one request per id"
            );
        }

        let mut patches = Vec::with_capacity(ids.len());
        let mut updates = updates.into_iter().peekable();
        for id in &ids {
            let patch = list.allocate_patch();
            let own = match updates.peek() {
                Some(update) if update.id == *id => updates.next().into_iter().collect(),
                _ => Vec::new(),
            };
            list.apply(ListEvent::ActionDispatched {
                patch,
                action: action.name(),
                updates: own,
            });
            patches.push(patch);
        }

        let results = join_all(ids.iter().map(|id| self.sink.perform(id, action))).await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for ((id, patch), result) in ids.into_iter().zip(patches).zip(results) {
            match result {
                Ok(()) => {
                    list.apply(ListEvent::ActionSucceeded {
                        patch,
                        refetch: false,
                    });
                    succeeded.push(id);
                }
                Err(error) => {
                    warn!(
                        resource = list.resource(),
                        action = action.name(),
                        id = %id,
                        error = %error,
                        "Bulk item refused; rolling back"
                    );
                    counter!(
                        METRIC_ACTION_FAILED_TOTAL,
                        "resource" => list.resource(),
                        "action" => action.name()
                    )
                    .increment(1);
                    list.apply(ListEvent::ActionFailed {
                        patch,
                        reconcile: ReconcileMode::Rollback,
                    });
                    failed.push(ItemFailure { id, error });
                }
            }
        }

        list.apply(ListEvent::Selection(SelectionChange::Remove(
            succeeded.clone(),
        )));

        if failed.is_empty() {
            BulkOutcome::Completed { ids: succeeded }
        } else {
            BulkOutcome::Partial { succeeded, failed }
        }
    }
}
