use sea_orm::entity::prelude::*;

/// Versioned waypoint-sequence row, keyed by normalized name. Same temporal
/// model as accounts: one active row per name, enforced by a partial unique
/// index created in the initial migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "waypoint_sets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub description: String,

    pub valid_from: String,

    pub valid_until: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::waypoints::Entity")]
    Waypoints,
}

impl Related<super::waypoints::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Waypoints.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
