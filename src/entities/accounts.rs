use sea_orm::entity::prelude::*;

/// Versioned account row. Every change inserts a new row; the row with
/// `valid_until = NULL` is the active version for its username.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Normalized (trimmed, lowercased) email-shaped username. Not declared
    /// unique here: historical rows share it. A partial unique index in the
    /// initial migration enforces at most one active row per username.
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub nickname: String,

    /// JSON array of role tags
    pub roles: String,

    pub valid_from: String,

    pub valid_until: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
