use sea_orm::entity::prelude::*;

/// Ordered geolocated clue belonging to one version of a waypoint set.
/// Entries are immutable: updating a set inserts a new set row with a fresh
/// batch of entries, leaving historical entries attached to their old row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "waypoints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub set_id: i32,

    pub seq_order: i32,

    pub latitude: f64,

    pub longitude: f64,

    pub radius: i32,

    pub clue: String,

    /// JSON array of hint strings
    pub hints: String,

    pub image_subject: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::waypoint_sets::Entity",
        from = "Column::SetId",
        to = "super::waypoint_sets::Column::Id"
    )]
    Set,
}

impl Related<super::waypoint_sets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Set.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
