//! Database integration tests
//!
//! These tests exercise the libsql backend against a SQLite file in a
//! temporary directory.

use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use house_service::db::{CredentialStore, DatabaseProvider, FlatStore, HouseStore, TursoClient};
use house_service::types::{AppError, FlatStatus, NewFlat, NewHouse, Role};
use tempfile::TempDir;

/// Test helper to create a TursoClient on a fresh database file
async fn create_test_client() -> (TursoClient, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("house.db");
    let client = TursoClient::new_local(path.to_str().expect("utf-8 path"))
        .await
        .expect("Failed to create local database");

    (client, dir)
}

fn new_house(address: &str) -> NewHouse {
    NewHouse {
        address: address.to_string(),
        year: 2020,
        developer: Some("Acme".to_string()),
    }
}

fn new_flat(house_id: i64, number: i32) -> NewFlat {
    NewFlat {
        house_id,
        number,
        rooms: 2,
        price: 5_000_000,
    }
}

#[tokio::test]
async fn test_create_local_client() {
    let (client, _dir) = create_test_client().await;

    assert!(client.connection().is_ok());
}

#[tokio::test]
async fn test_nested_path_is_created() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested/deeper/house.db");

    let stores = DatabaseProvider::SQLite {
        path: path.to_string_lossy().into_owned(),
    }
    .create_stores()
    .await
    .expect("should open");

    assert!(path.exists());
    assert!(matches!(
        stores.credentials.find_user_by_email("nobody@x.com").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_schema_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("house.db");
    let path = path.to_str().expect("utf-8 path");

    {
        let client = TursoClient::new_local(path).await.expect("first open");
        client
            .create_user("m@x.com", "digest", Role::Moderator)
            .await
            .expect("create user");
    }

    let client = TursoClient::new_local(path).await.expect("second open");
    let user = client.find_user_by_email("m@x.com").await.expect("find");
    assert_eq!(user.role, Role::Moderator);
}

#[tokio::test]
async fn test_create_and_find_user() {
    let (client, _dir) = create_test_client().await;

    let created = client
        .create_user("c@x.com", "$argon2id$digest", Role::Client)
        .await
        .expect("Failed to create user");
    let found = client
        .find_user_by_email("c@x.com")
        .await
        .expect("Failed to find user");

    assert_eq!(created, found);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let (client, _dir) = create_test_client().await;
    client
        .create_user("m@x.com", "h1", Role::Moderator)
        .await
        .expect("first insert");

    let second = client.create_user("m@x.com", "h2", Role::Client).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
    let kept = client.find_user_by_email("m@x.com").await.expect("find");
    assert_eq!(kept.password_hash, "h1");
}

#[tokio::test]
async fn test_house_round_trip() {
    let (client, _dir) = create_test_client().await;
    let at = Utc::now();

    let house = client
        .create_house(&new_house("1 Main St"), at)
        .await
        .expect("create house");
    let fetched = client.get_house(house.id).await.expect("get house");

    assert_eq!(fetched.address, "1 Main St");
    assert_eq!(fetched.developer.as_deref(), Some("Acme"));
    assert_eq!(fetched.created_at.timestamp_millis(), at.timestamp_millis());
    assert_eq!(fetched.updated_at, fetched.created_at);
}

#[tokio::test]
async fn test_house_without_developer() {
    let (client, _dir) = create_test_client().await;

    let house = client
        .create_house(
            &NewHouse {
                developer: None,
                ..new_house("2 Main St")
            },
            Utc::now(),
        )
        .await
        .expect("create house");

    assert_eq!(client.get_house(house.id).await.expect("get").developer, None);
}

#[tokio::test]
async fn test_duplicate_address_conflicts() {
    let (client, _dir) = create_test_client().await;
    client
        .create_house(&new_house("1 Main St"), Utc::now())
        .await
        .expect("first");

    assert!(matches!(
        client.create_house(&new_house("1 Main St"), Utc::now()).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_flat_writes_touch_house() {
    let (client, _dir) = create_test_client().await;
    let t0 = Utc::now();
    let house = client
        .create_house(&new_house("1 Main St"), t0)
        .await
        .expect("house");

    let t1 = t0 + TimeDelta::minutes(1);
    let flat = client
        .create_flat(&new_flat(house.id, 1), t1)
        .await
        .expect("flat");
    assert_eq!(flat.status, FlatStatus::Created);
    assert_eq!(
        client.get_house(house.id).await.expect("house").updated_at.timestamp_millis(),
        t1.timestamp_millis()
    );

    let t2 = t1 + TimeDelta::minutes(1);
    let updated = client
        .update_flat_status(flat.id, FlatStatus::Approved, t2)
        .await
        .expect("update");
    assert_eq!(updated.status, FlatStatus::Approved);
    assert_eq!(
        client.get_house(house.id).await.expect("house").updated_at.timestamp_millis(),
        t2.timestamp_millis()
    );
}

#[tokio::test]
async fn test_flat_for_unknown_house_is_rolled_back() {
    let (client, _dir) = create_test_client().await;

    let result = client.create_flat(&new_flat(42, 1), Utc::now()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(client
        .list_flats(42, &FlatStatus::ALL)
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn test_failed_house_touch_rolls_back_status() {
    let (client, _dir) = create_test_client().await;
    let house = client
        .create_house(&new_house("1 Main St"), Utc::now())
        .await
        .expect("house");
    let flat = client
        .create_flat(&new_flat(house.id, 1), Utc::now())
        .await
        .expect("flat");

    let conn = client.connection().expect("connection");
    conn.execute("PRAGMA foreign_keys = OFF", ())
        .await
        .expect("pragma");
    conn.execute("DELETE FROM houses WHERE id = ?", [house.id])
        .await
        .expect("delete house");

    let result = client
        .update_flat_status(flat.id, FlatStatus::Approved, Utc::now())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(
        client.get_flat(flat.id).await.expect("flat").status,
        FlatStatus::Created
    );
}

#[tokio::test]
async fn test_duplicate_flat_number_conflicts() {
    let (client, _dir) = create_test_client().await;
    let house = client
        .create_house(&new_house("1 Main St"), Utc::now())
        .await
        .expect("house");
    client
        .create_flat(&new_flat(house.id, 7), Utc::now())
        .await
        .expect("first");

    assert!(matches!(
        client.create_flat(&new_flat(house.id, 7), Utc::now()).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_list_flats_filters_statuses() {
    let (client, _dir) = create_test_client().await;
    let house = client
        .create_house(&new_house("1 Main St"), Utc::now())
        .await
        .expect("house");

    let mut ids = Vec::new();
    for (number, status) in [
        (1, FlatStatus::Created),
        (2, FlatStatus::Approved),
        (3, FlatStatus::OnModeration),
    ] {
        let flat = client
            .create_flat(&new_flat(house.id, number), Utc::now())
            .await
            .expect("flat");
        client
            .update_flat_status(flat.id, status, Utc::now())
            .await
            .expect("status");
        ids.push(flat.id);
    }

    let approved: Vec<i64> = client
        .list_flats(house.id, &[FlatStatus::Approved])
        .await
        .expect("list")
        .iter()
        .map(|f| f.id)
        .collect();
    let moderator_view: Vec<i64> = client
        .list_flats(
            house.id,
            &[FlatStatus::Created, FlatStatus::Approved, FlatStatus::Declined],
        )
        .await
        .expect("list")
        .iter()
        .map(|f| f.id)
        .collect();

    assert_eq!(approved, vec![ids[1]]);
    assert_eq!(moderator_view, vec![ids[0], ids[1]]);
    assert!(client.list_flats(house.id, &[]).await.expect("list").is_empty());
}

// ============= Concurrency Tests =============

const PARALLEL: usize = 20;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_flat_creation_all_succeed() {
    let (client, _dir) = create_test_client().await;
    let client = Arc::new(client);
    let house = client
        .create_house(&new_house("1 Main St"), Utc::now())
        .await
        .expect("house");
    let house_id = house.id;

    let handles: Vec<_> = (1..=PARALLEL as i32)
        .map(|number| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .create_flat(&new_flat(house_id, number), Utc::now())
                    .await
            })
        })
        .collect();

    let mut failures = Vec::new();
    for handle in handles {
        if let Err(e) = handle.await.expect("task panicked") {
            failures.push(e.to_string());
        }
    }

    assert!(failures.is_empty(), "failed writes: {:?}", failures);
    assert_eq!(
        client
            .list_flats(house.id, &FlatStatus::ALL)
            .await
            .expect("list")
            .len(),
        PARALLEL
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_registration_same_email_conflicts() {
    let (client, _dir) = create_test_client().await;
    let client = Arc::new(client);

    let handles: Vec<_> = (0..PARALLEL)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .create_user("m@x.com", &format!("digest-{}", i), Role::Moderator)
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    let mut other = Vec::new();
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => other.push(e.to_string()),
        }
    }

    assert!(other.is_empty(), "unexpected errors: {:?}", other);
    assert_eq!(created, 1);
    assert_eq!(conflicts, PARALLEL - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_same_flat_number_conflicts() {
    let (client, _dir) = create_test_client().await;
    let client = Arc::new(client);
    let house = client
        .create_house(&new_house("1 Main St"), Utc::now())
        .await
        .expect("house");
    let house_id = house.id;

    let handles: Vec<_> = (0..PARALLEL)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .create_flat(&new_flat(house_id, 7), Utc::now())
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, PARALLEL - 1);
}
