//! Ports describing the admin API as seen by the list and moderation engine.

use async_trait::async_trait;

use crate::{
    application::{
        error::ApiError,
        pagination::{ListQuery, Page},
    },
    domain::{entities::ListRow, moderation::RowAction},
};

/// Read side of one list resource.
#[async_trait]
pub trait ListSource<R: ListRow>: Send + Sync {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<R>, ApiError>;
}

/// Write side of one list resource.
#[async_trait]
pub trait ActionSink<R: ListRow, A: RowAction<R>>: Send + Sync {
    async fn perform(&self, id: &str, action: &A) -> Result<(), ApiError>;

    /// Apply `action` to every id in one request. Resources without a bulk
    /// endpoint for `action` keep the default.
    async fn perform_batch(&self, ids: &[String], action: &A) -> Result<(), ApiError> {
        let _ = ids;
        Err(ApiError::Unsupported(action.name()))
    }
}
