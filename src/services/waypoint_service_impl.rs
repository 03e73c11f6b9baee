use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{NewWaypointSet, Store, Waypoint, WaypointSetChanges};
use crate::domain::validation::{self, WaypointDraft, WaypointSetDraft, normalize_key};
use crate::services::waypoint_service::{UpsertWaypointSet, WaypointError, WaypointService};

pub struct SeaOrmWaypointService {
    store: Arc<Store>,
}

impl SeaOrmWaypointService {
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WaypointService for SeaOrmWaypointService {
    async fn create(
        &self,
        input: UpsertWaypointSet,
    ) -> Result<crate::db::WaypointSet, WaypointError> {
        let draft =
            validation::validate_waypoint_set(&input.name, &input.description, &input.waypoints)?;

        if self.store.find_active_waypoint_set(&draft.name).await?.is_some() {
            return Err(WaypointError::Conflict(format!(
                "waypoint set '{}' already exists",
                draft.name
            )));
        }
        if self.store.waypoint_set_exists_any_version(&draft.name).await? {
            debug!("Waypoint set name '{}' previously existed, recreating", draft.name);
        }

        let set = self.store.create_waypoint_set(to_new_set(draft)).await?;

        info!(
            "Created waypoint set '{}' with {} waypoints",
            set.name,
            set.waypoints.len()
        );
        Ok(set)
    }

    async fn update(
        &self,
        path_name: &str,
        input: UpsertWaypointSet,
    ) -> Result<crate::db::WaypointSet, WaypointError> {
        let path_key = normalize_key(path_name);
        if normalize_key(&input.name) != path_key {
            return Err(WaypointError::Validation(
                "waypoint_name in body must match name in path".to_string(),
            ));
        }

        let draft =
            validation::validate_waypoint_set(&input.name, &input.description, &input.waypoints)?;

        let set = self
            .store
            .update_waypoint_set(
                &path_key,
                WaypointSetChanges {
                    description: draft.description,
                    waypoints: draft.waypoints.into_iter().map(to_waypoint).collect(),
                },
            )
            .await?;

        info!(
            "Updated waypoint set '{}' ({} waypoints)",
            set.name,
            set.waypoints.len()
        );
        Ok(set)
    }

    async fn delete(&self, name: &str) -> Result<(), WaypointError> {
        let key = normalize_key(name);
        self.store.soft_delete_waypoint_set(&key).await?;
        info!("Deleted waypoint set '{}'", key);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<crate::db::WaypointSet, WaypointError> {
        let key = normalize_key(name);
        self.store
            .find_active_waypoint_set(&key)
            .await?
            .ok_or_else(|| WaypointError::NotFound(format!("waypoint set '{key}' not found")))
    }

    async fn list(&self) -> Result<Vec<crate::db::WaypointSet>, WaypointError> {
        Ok(self.store.list_waypoint_sets().await?)
    }

    async fn history(&self, name: &str) -> Result<Vec<crate::db::WaypointSet>, WaypointError> {
        let key = normalize_key(name);
        Ok(self.store.waypoint_set_history(&key).await?)
    }
}

fn to_new_set(draft: WaypointSetDraft) -> NewWaypointSet {
    NewWaypointSet {
        name: draft.name,
        description: draft.description,
        waypoints: draft.waypoints.into_iter().map(to_waypoint).collect(),
    }
}

fn to_waypoint(draft: WaypointDraft) -> Waypoint {
    Waypoint {
        seq_order: draft.seq_order,
        latitude: draft.latitude,
        longitude: draft.longitude,
        radius: draft.radius,
        clue: draft.clue,
        hints: draft.hints,
        image_subject: draft.image_subject,
    }
}
