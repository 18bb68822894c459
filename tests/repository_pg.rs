//! PostgreSQL backend tests. `#[sqlx::test]` creates a fresh database per
//! test on the server named by `DATABASE_URL`.

mod common;

use sqlx::PgPool;
use shortener_store::domain::repositories::{UrlRepository, UserRepository};
use shortener_store::error::StorageError;

#[sqlx::test(migrations = false)]
async fn test_add_and_lookup(pool: PgPool) {
    let storage = common::pg_storage(pool).await;
    let urls = storage.urls();

    urls.add(
        Some("u1"),
        common::batch(&[("abc", "https://example.com"), ("def", "https://rust-lang.org")]),
    )
    .await
    .unwrap();

    assert_eq!(urls.get_url("abc").await.unwrap(), "https://example.com");
    assert_eq!(
        urls.get_alias(Some("u1"), "https://rust-lang.org").await.unwrap(),
        "def"
    );
    assert!(matches!(
        urls.get_alias(Some("u2"), "https://rust-lang.org").await,
        Err(StorageError::NotFound(_))
    ));
}

#[sqlx::test(migrations = false)]
async fn test_anonymous_records(pool: PgPool) {
    let storage = common::pg_storage(pool).await;
    let urls = storage.urls();

    urls.add(None, common::batch(&[("anon", "https://example.com")]))
        .await
        .unwrap();

    assert_eq!(urls.get_alias(None, "https://example.com").await.unwrap(), "anon");

    let err = urls
        .add(None, common::batch(&[("anon2", "https://example.com")]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict { .. }));
}

#[sqlx::test(migrations = false)]
async fn test_batch_is_all_or_nothing(pool: PgPool) {
    let storage = common::pg_storage(pool).await;
    let urls = storage.urls();

    urls.add(None, common::batch(&[("taken", "https://one.example")]))
        .await
        .unwrap();

    let err = urls
        .add(
            None,
            common::batch(&[("fresh", "https://two.example"), ("taken", "https://three.example")]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::AliasTaken(_)));
    assert!(matches!(
        urls.get_url("fresh").await,
        Err(StorageError::NotFound(_))
    ));
}

#[sqlx::test(migrations = false)]
async fn test_soft_delete(pool: PgPool) {
    let storage = common::pg_storage(pool).await;
    let urls = storage.urls();

    urls.add(
        Some("u1"),
        common::batch(&[("abc", "https://a.example"), ("def", "https://b.example")]),
    )
    .await
    .unwrap();

    let aliases = vec!["abc".to_string()];
    urls.delete_user_urls("u1", &aliases).await.unwrap();
    urls.delete_user_urls("u1", &aliases).await.unwrap();
    urls.delete_user_urls("u2", &["def".to_string()]).await.unwrap();

    assert!(matches!(
        urls.get_url("abc").await,
        Err(StorageError::Deleted(_))
    ));
    let listed = urls.get_user_urls("u1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed["def"], "https://b.example");

    // Deleted rows still hold their alias.
    let err = urls
        .add(Some("u1"), common::batch(&[("abc", "https://c.example")]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::AliasTaken(_)));
}

#[sqlx::test(migrations = false)]
async fn test_users(pool: PgPool) {
    let storage = common::pg_storage(pool).await;
    let users = storage.users();

    let alice = users
        .create_user(common::new_user("alice", "u-a"))
        .await
        .unwrap();
    assert_eq!(users.find_by_login("alice").await.unwrap(), Some(alice));
    assert_eq!(users.find_by_login("bob").await.unwrap(), None);

    let err = users
        .create_user(common::new_user("alice", "u-b"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateLogin(ref login) if login == "alice"));
}

#[sqlx::test(migrations = false)]
async fn test_schema_is_idempotent(pool: PgPool) {
    shortener_store::infrastructure::persistence::schema::init_schema(&pool)
        .await
        .unwrap();
    let storage = common::pg_storage(pool).await;

    storage.urls().ping().await.unwrap();
    storage.close().await.unwrap();
    storage.close().await.unwrap();
}

#[sqlx::test(migrations = false)]
async fn test_alias_owners_and_empty_owner_scope(pool: PgPool) {
    let storage = common::pg_storage(pool).await;
    let urls = storage.urls();

    urls.add(None, common::batch(&[("anon", "https://example.com")]))
        .await
        .unwrap();

    assert_eq!(
        urls.get_alias(Some(""), "https://example.com").await.unwrap(),
        "anon"
    );

    let err = urls
        .add(Some("u1"), common::batch(&[("anon", "https://other.example")]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::AliasTaken(_)));
    assert_eq!(urls.get_url("anon").await.unwrap(), "https://example.com");
}
