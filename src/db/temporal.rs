//! Generic temporal versioning over append-only entity tables.
//!
//! Both versioned aggregates (accounts, waypoint sets) follow the same model:
//! every row carries a `valid_from`/`valid_until` window, and for a given
//! natural key at most one row is active (`valid_until IS NULL`). The helpers
//! here implement the key-scoped reads and the close-active write shared by
//! both; inserting a replacement version is entity-specific and lives in the
//! repositories, inside the same transaction as the close.
//!
//! Keys arrive already normalized (trimmed, lowercased) from the validation
//! layer; the store treats them as opaque strings.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    SqlErr,
};
use thiserror::Error;

/// Errors raised by the temporal record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// A versioned entity addressed by a natural key.
pub trait TemporalEntity: EntityTrait {
    fn key_col() -> Self::Column;
    fn valid_from_col() -> Self::Column;
    fn valid_until_col() -> Self::Column;
}

/// Current UTC timestamp in the RFC 3339 form stored in validity columns.
/// All timestamps share one format and zone, so string order is time order.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// The single active version for `key`, if any. Absence is not an error;
/// callers decide whether it is.
pub async fn find_active<E, C>(conn: &C, key: &str) -> Result<Option<E::Model>, StoreError>
where
    E: TemporalEntity,
    C: ConnectionTrait,
{
    Ok(E::find()
        .filter(E::key_col().eq(key))
        .filter(E::valid_until_col().is_null())
        .one(conn)
        .await?)
}

/// Every version for `key`, newest `valid_from` first. Empty if the key was
/// never used.
pub async fn history<E, C>(conn: &C, key: &str) -> Result<Vec<E::Model>, StoreError>
where
    E: TemporalEntity,
    C: ConnectionTrait,
{
    Ok(E::find()
        .filter(E::key_col().eq(key))
        .order_by_desc(E::valid_from_col())
        .all(conn)
        .await?)
}

/// Whether any row, active or historical, exists for `key`. Used to tell
/// "brand new name" apart from "previously used and released".
pub async fn exists_any_version<E, C>(conn: &C, key: &str) -> Result<bool, StoreError>
where
    E: TemporalEntity,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let count = E::find().filter(E::key_col().eq(key)).count(conn).await?;
    Ok(count > 0)
}

/// Close the active row for `key` by setting `valid_until`. Returns the
/// number of rows closed (0 or 1 given the partial unique index). Run inside
/// the caller's transaction when an insert must follow atomically.
pub async fn close_active<E, C>(conn: &C, key: &str, at: &str) -> Result<u64, StoreError>
where
    E: TemporalEntity,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(E::valid_until_col(), Expr::value(at))
        .filter(E::key_col().eq(key))
        .filter(E::valid_until_col().is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Map an insert failure to `Conflict` when the partial unique index rejected
/// a second active row for the key. The application-level existence check is
/// only a fast path; this is the authoritative guard under concurrency.
pub fn conflict_on_unique(err: DbErr, message: impl Into<String>) -> StoreError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        StoreError::Conflict(message.into())
    } else {
        StoreError::Database(err)
    }
}
