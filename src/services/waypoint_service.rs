use async_trait::async_trait;
use thiserror::Error;

use crate::db::{StoreError, WaypointSet};
use crate::domain::validation::{ValidationError, WaypointDraft};

#[derive(Debug, Error)]
pub enum WaypointError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for WaypointError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<ValidationError> for WaypointError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// A full waypoint-set submission. Create and update take the same shape:
/// entries always replace the previous batch wholesale.
#[derive(Debug, Clone)]
pub struct UpsertWaypointSet {
    pub name: String,
    pub description: String,
    pub waypoints: Vec<WaypointDraft>,
}

#[async_trait]
pub trait WaypointService: Send + Sync {
    /// Validate and persist the first active version of a named set.
    async fn create(&self, input: UpsertWaypointSet) -> Result<WaypointSet, WaypointError>;

    /// Replace the active version of the set at `path_name`.
    async fn update(
        &self,
        path_name: &str,
        input: UpsertWaypointSet,
    ) -> Result<WaypointSet, WaypointError>;

    async fn delete(&self, name: &str) -> Result<(), WaypointError>;

    async fn get(&self, name: &str) -> Result<WaypointSet, WaypointError>;

    async fn list(&self) -> Result<Vec<WaypointSet>, WaypointError>;

    /// Every version of the set, newest first, entries included.
    async fn history(&self, name: &str) -> Result<Vec<WaypointSet>, WaypointError>;
}
