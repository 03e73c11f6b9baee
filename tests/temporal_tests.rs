//! Store-level tests for the versioning rules: one active row per key,
//! gapless succession on update, and history that survives deletion.

use sea_orm::{ActiveModelTrait, Set, SqlErr};
use waymark::db::temporal;
use waymark::db::{
    AccountChanges, NewAccount, NewWaypointSet, Store, StoreError, Waypoint, WaypointSetChanges,
};
use waymark::domain::Role;
use waymark::entities::accounts;

async fn test_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("waymark-store-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to create store")
}

fn new_account(username: &str) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        password_hash: "$argon2id$fake-hash".to_string(),
        nickname: "Tester".to_string(),
        roles: vec![Role::Player],
    }
}

fn new_set(name: &str, entries: usize) -> NewWaypointSet {
    let waypoints = (1..=entries as i32)
        .map(|seq| Waypoint {
            seq_order: seq,
            latitude: 40.0 + f64::from(seq),
            longitude: -73.0,
            radius: 25,
            clue: format!("clue {seq}"),
            hints: vec![],
            image_subject: "statue".to_string(),
        })
        .collect();

    NewWaypointSet {
        name: name.to_string(),
        description: "a route".to_string(),
        waypoints,
    }
}

#[tokio::test]
async fn create_then_find_active() {
    let store = test_store().await;

    let created = store.create_account(new_account("a@b.com")).await.unwrap();
    assert!(created.valid_until.is_none());

    let found = store.find_active_account("a@b.com").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.roles, vec![Role::Player]);
}

#[tokio::test]
async fn second_create_for_live_key_conflicts() {
    let store = test_store().await;

    store.create_account(new_account("a@b.com")).await.unwrap();
    let err = store.create_account(new_account("a@b.com")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn unique_index_is_the_authoritative_guard() {
    let store = test_store().await;
    store.create_account(new_account("a@b.com")).await.unwrap();

    // a raw entity insert sidesteps the repository's existence check, so
    // only the partial unique index can stop this second active row
    let row = accounts::ActiveModel {
        username: Set("a@b.com".to_string()),
        password_hash: Set("$argon2id$other-hash".to_string()),
        nickname: Set("Imposter".to_string()),
        roles: Set(r#"["player"]"#.to_string()),
        valid_from: Set(temporal::now()),
        valid_until: Set(None),
        ..Default::default()
    };
    let err = row.insert(&store.conn).await.unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));

    // a closed row for the same username is outside the index predicate
    let now = temporal::now();
    let row = accounts::ActiveModel {
        username: Set("a@b.com".to_string()),
        password_hash: Set("$argon2id$other-hash".to_string()),
        nickname: Set("Historian".to_string()),
        roles: Set(r#"["player"]"#.to_string()),
        valid_from: Set(now.clone()),
        valid_until: Set(Some(now)),
        ..Default::default()
    };
    row.insert(&store.conn).await.unwrap();
}

#[tokio::test]
async fn racing_creates_leave_exactly_one_active_row() {
    let store = test_store().await;

    let (a, b) = tokio::join!(
        store.create_account(new_account("race@b.com")),
        store.create_account(new_account("race@b.com")),
    );

    // whichever interleaving wins, one create lands and the other maps to
    // Conflict (via the fast path or the index violation)
    let loser = match (a, b) {
        (Ok(_), Err(e)) | (Err(e), Ok(_)) => e,
        other => panic!("expected one success and one conflict, got {other:?}"),
    };
    assert!(matches!(loser, StoreError::Conflict(_)));

    let history = store.account_history("race@b.com").await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].valid_until.is_none());
}

#[tokio::test]
async fn update_closes_old_version_and_opens_new_one() {
    let store = test_store().await;

    store.create_account(new_account("a@b.com")).await.unwrap();
    let updated = store
        .update_account(
            "a@b.com",
            AccountChanges {
                nickname: "Renamed".to_string(),
                roles: vec![Role::Player, Role::Viewer],
                password_hash: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.nickname, "Renamed");
    assert!(updated.valid_until.is_none());

    let history = store.account_history("a@b.com").await.unwrap();
    assert_eq!(history.len(), 2);
    // newest first; the closed row ends exactly where the new one begins
    assert!(history[0].valid_until.is_none());
    assert_eq!(history[1].valid_until.as_deref(), Some(history[0].valid_from.as_str()));
}

#[tokio::test]
async fn update_without_password_keeps_the_old_hash() {
    let store = test_store().await;

    store.create_account(new_account("a@b.com")).await.unwrap();
    store
        .update_account(
            "a@b.com",
            AccountChanges {
                nickname: "Renamed".to_string(),
                roles: vec![Role::Player],
                password_hash: None,
            },
        )
        .await
        .unwrap();

    let (_, hash) = store.find_account_with_hash("a@b.com").await.unwrap().unwrap();
    assert_eq!(hash, "$argon2id$fake-hash");

    store
        .update_account(
            "a@b.com",
            AccountChanges {
                nickname: "Renamed".to_string(),
                roles: vec![Role::Player],
                password_hash: Some("$argon2id$new-hash".to_string()),
            },
        )
        .await
        .unwrap();

    let (_, hash) = store.find_account_with_hash("a@b.com").await.unwrap().unwrap();
    assert_eq!(hash, "$argon2id$new-hash");
}

#[tokio::test]
async fn update_of_missing_key_is_not_found() {
    let store = test_store().await;

    let err = store
        .update_account(
            "ghost@b.com",
            AccountChanges {
                nickname: "Ghost".to_string(),
                roles: vec![Role::Player],
                password_hash: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn soft_delete_fires_once() {
    let store = test_store().await;

    store.create_account(new_account("a@b.com")).await.unwrap();
    store.soft_delete_account("a@b.com").await.unwrap();

    assert!(store.find_active_account("a@b.com").await.unwrap().is_none());

    let err = store.soft_delete_account("a@b.com").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn deleted_key_can_be_recreated_with_history_intact() {
    let store = test_store().await;

    store.create_account(new_account("a@b.com")).await.unwrap();
    store.soft_delete_account("a@b.com").await.unwrap();

    assert!(store.account_exists_any_version("a@b.com").await.unwrap());
    assert!(!store.account_exists_any_version("nobody@b.com").await.unwrap());

    store.create_account(new_account("a@b.com")).await.unwrap();

    let history = store.account_history("a@b.com").await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].valid_until.is_none());
    assert!(history[1].valid_until.is_some());
}

#[tokio::test]
async fn history_of_unknown_key_is_empty() {
    let store = test_store().await;
    assert!(store.account_history("nobody@b.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_skips_retired_accounts() {
    let store = test_store().await;

    store.create_account(new_account("a@b.com")).await.unwrap();
    store.create_account(new_account("b@b.com")).await.unwrap();
    store.soft_delete_account("a@b.com").await.unwrap();

    let usernames: Vec<String> = store
        .list_accounts()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.username)
        .collect();

    // seeded admin plus the one still-active account
    assert_eq!(usernames, vec!["admin@waymark.local", "b@b.com"]);
}

#[tokio::test]
async fn waypoint_set_round_trip_keeps_entry_order() {
    let store = test_store().await;

    store.create_waypoint_set(new_set("tour", 3)).await.unwrap();

    let set = store.find_active_waypoint_set("tour").await.unwrap().unwrap();
    let orders: Vec<i32> = set.waypoints.iter().map(|w| w.seq_order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[tokio::test]
async fn waypoint_versions_keep_their_own_entries() {
    let store = test_store().await;

    store.create_waypoint_set(new_set("tour", 1)).await.unwrap();
    store
        .update_waypoint_set(
            "tour",
            WaypointSetChanges {
                description: "longer route".to_string(),
                waypoints: new_set("tour", 3).waypoints,
            },
        )
        .await
        .unwrap();

    let history = store.waypoint_set_history("tour").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].waypoints.len(), 3);
    assert_eq!(history[1].waypoints.len(), 1);
}

#[tokio::test]
async fn waypoint_set_conflict_and_recreation() {
    let store = test_store().await;

    store.create_waypoint_set(new_set("tour", 2)).await.unwrap();
    let err = store.create_waypoint_set(new_set("tour", 2)).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    store.soft_delete_waypoint_set("tour").await.unwrap();
    store.create_waypoint_set(new_set("tour", 2)).await.unwrap();

    assert_eq!(store.waypoint_set_history("tour").await.unwrap().len(), 2);
}
