use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::db::temporal::{self, StoreError, TemporalEntity};
use crate::entities::prelude::{WaypointSets, Waypoints};
use crate::entities::{waypoint_sets, waypoints};

impl TemporalEntity for WaypointSets {
    fn key_col() -> waypoint_sets::Column {
        waypoint_sets::Column::Name
    }

    fn valid_from_col() -> waypoint_sets::Column {
        waypoint_sets::Column::ValidFrom
    }

    fn valid_until_col() -> waypoint_sets::Column {
        waypoint_sets::Column::ValidUntil
    }
}

/// One geolocated clue inside a set version.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub seq_order: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: i32,
    pub clue: String,
    pub hints: Vec<String>,
    pub image_subject: String,
}

/// One version of a named waypoint sequence with its entries.
#[derive(Debug, Clone)]
pub struct WaypointSet {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub waypoints: Vec<Waypoint>,
    pub valid_from: String,
    pub valid_until: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWaypointSet {
    pub name: String,
    pub description: String,
    pub waypoints: Vec<Waypoint>,
}

/// Replacement fields for an update. Entries are replaced wholesale: the new
/// version owns a fresh batch and historical versions keep theirs.
#[derive(Debug, Clone)]
pub struct WaypointSetChanges {
    pub description: String,
    pub waypoints: Vec<Waypoint>,
}

pub struct WaypointRepository {
    conn: DatabaseConnection,
}

impl WaypointRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_active(&self, name: &str) -> Result<Option<WaypointSet>, StoreError> {
        let Some(model) = temporal::find_active::<WaypointSets, _>(&self.conn, name).await? else {
            return Ok(None);
        };
        Ok(Some(self.hydrate(&self.conn, model).await?))
    }

    /// Insert the set row and all of its entries in one transaction; an
    /// invalid or failed entry insert rolls the whole write back.
    pub async fn create(&self, input: NewWaypointSet) -> Result<WaypointSet, StoreError> {
        if temporal::find_active::<WaypointSets, _>(&self.conn, &input.name)
            .await?
            .is_some()
        {
            return Err(StoreError::Conflict(format!(
                "waypoint set '{}' already exists",
                input.name
            )));
        }

        let txn = self.conn.begin().await?;

        let name = input.name.clone();
        let row = waypoint_sets::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            valid_from: Set(temporal::now()),
            valid_until: Set(None),
            ..Default::default()
        };

        let model = row.insert(&txn).await.map_err(|e| {
            temporal::conflict_on_unique(e, format!("waypoint set '{name}' already exists"))
        })?;

        insert_entries(&txn, model.id, &input.waypoints).await?;
        txn.commit().await?;

        Ok(assemble(model, input.waypoints))
    }

    pub async fn update(
        &self,
        name: &str,
        changes: WaypointSetChanges,
    ) -> Result<WaypointSet, StoreError> {
        let txn = self.conn.begin().await?;

        if temporal::find_active::<WaypointSets, _>(&txn, name).await?.is_none() {
            return Err(StoreError::NotFound(format!(
                "waypoint set '{name}' not found"
            )));
        }

        let now = temporal::now();
        temporal::close_active::<WaypointSets, _>(&txn, name, &now).await?;

        let row = waypoint_sets::ActiveModel {
            name: Set(name.to_string()),
            description: Set(changes.description),
            valid_from: Set(now),
            valid_until: Set(None),
            ..Default::default()
        };

        let model = row.insert(&txn).await?;
        insert_entries(&txn, model.id, &changes.waypoints).await?;
        txn.commit().await?;

        Ok(assemble(model, changes.waypoints))
    }

    pub async fn soft_delete(&self, name: &str) -> Result<(), StoreError> {
        let now = temporal::now();
        let closed = temporal::close_active::<WaypointSets, _>(&self.conn, name, &now).await?;
        if closed == 0 {
            return Err(StoreError::NotFound(format!(
                "waypoint set '{name}' not found"
            )));
        }
        Ok(())
    }

    /// All versions newest first, each with the entries of that version.
    pub async fn history(&self, name: &str) -> Result<Vec<WaypointSet>, StoreError> {
        let models = temporal::history::<WaypointSets, _>(&self.conn, name).await?;
        let mut sets = Vec::with_capacity(models.len());
        for model in models {
            sets.push(self.hydrate(&self.conn, model).await?);
        }
        Ok(sets)
    }

    pub async fn exists_any_version(&self, name: &str) -> Result<bool, StoreError> {
        temporal::exists_any_version::<WaypointSets, _>(&self.conn, name).await
    }

    /// All active sets ordered by name, entries included.
    pub async fn list(&self) -> Result<Vec<WaypointSet>, StoreError> {
        let models = WaypointSets::find()
            .filter(waypoint_sets::Column::ValidUntil.is_null())
            .order_by_asc(waypoint_sets::Column::Name)
            .all(&self.conn)
            .await?;

        let mut sets = Vec::with_capacity(models.len());
        for model in models {
            sets.push(self.hydrate(&self.conn, model).await?);
        }
        Ok(sets)
    }

    async fn hydrate<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: waypoint_sets::Model,
    ) -> Result<WaypointSet, StoreError> {
        let entries = Waypoints::find()
            .filter(waypoints::Column::SetId.eq(model.id))
            .order_by_asc(waypoints::Column::SeqOrder)
            .all(conn)
            .await?
            .into_iter()
            .map(to_waypoint)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(assemble(model, entries))
    }
}

async fn insert_entries<C: ConnectionTrait>(
    conn: &C,
    set_id: i32,
    entries: &[Waypoint],
) -> Result<(), StoreError> {
    if entries.is_empty() {
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|entry| {
            Ok(waypoints::ActiveModel {
                set_id: Set(set_id),
                seq_order: Set(entry.seq_order),
                latitude: Set(entry.latitude),
                longitude: Set(entry.longitude),
                radius: Set(entry.radius),
                clue: Set(entry.clue.clone()),
                hints: Set(encode_hints(&entry.hints)?),
                image_subject: Set(entry.image_subject.clone()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Waypoints::insert_many(rows).exec(conn).await?;
    Ok(())
}

fn assemble(model: waypoint_sets::Model, waypoints: Vec<Waypoint>) -> WaypointSet {
    WaypointSet {
        id: model.id,
        name: model.name,
        description: model.description,
        waypoints,
        valid_from: model.valid_from,
        valid_until: model.valid_until,
    }
}

fn encode_hints(hints: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(hints)
        .map_err(|e| StoreError::Database(sea_orm::DbErr::Custom(format!("encode hints: {e}"))))
}

fn to_waypoint(model: waypoints::Model) -> Result<Waypoint, StoreError> {
    let hints: Vec<String> = serde_json::from_str(&model.hints).map_err(|e| {
        StoreError::Database(sea_orm::DbErr::Custom(format!(
            "corrupt hints column for waypoint {}: {e}",
            model.id
        )))
    })?;

    Ok(Waypoint {
        seq_order: model.seq_order,
        latitude: model.latitude,
        longitude: model.longitude,
        radius: model.radius,
        clue: model.clue,
        hints,
        image_subject: model.image_subject,
    })
}
