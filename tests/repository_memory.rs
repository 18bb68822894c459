mod common;

use shortener_store::domain::repositories::{UrlRepository, UserRepository};
use shortener_store::error::StorageError;
use shortener_store::infrastructure::persistence::{MemoryUrlRepository, MemoryUserRepository};

#[tokio::test]
async fn test_add_then_lookup_both_ways() {
    let repo = MemoryUrlRepository::new();

    repo.add(
        Some("u1"),
        common::batch(&[("abc", "https://example.com"), ("def", "https://rust-lang.org")]),
    )
    .await
    .unwrap();

    assert_eq!(repo.get_url("abc").await.unwrap(), "https://example.com");
    assert_eq!(
        repo.get_alias(Some("u1"), "https://rust-lang.org").await.unwrap(),
        "def"
    );
}

#[tokio::test]
async fn test_get_alias_is_scoped_to_owner() {
    let repo = MemoryUrlRepository::new();
    repo.add(Some("u1"), common::batch(&[("abc", "https://example.com")]))
        .await
        .unwrap();

    let err = repo
        .get_alias(Some("u2"), "https://example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    let err = repo.get_alias(None, "https://example.com").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn test_second_alias_for_same_url_conflicts() {
    let repo = MemoryUrlRepository::new();
    repo.add(None, common::batch(&[("abc", "https://example.com")]))
        .await
        .unwrap();

    let err = repo
        .add(
            None,
            common::batch(&[("new1", "https://other.com"), ("new2", "https://example.com")]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict { alias: Some(ref a) } if a == "abc"));
    // Nothing from the rejected batch is visible.
    assert!(matches!(
        repo.get_url("new1").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleted_alias_reports_deleted() {
    let repo = MemoryUrlRepository::new();
    repo.add(Some("u1"), common::batch(&[("abc", "https://example.com")]))
        .await
        .unwrap();

    repo.delete_user_urls("u1", &["abc".to_string()]).await.unwrap();

    assert!(matches!(
        repo.get_url("abc").await,
        Err(StorageError::Deleted(_))
    ));
    assert!(repo.get_user_urls("u1").await.unwrap().is_empty());
    assert!(matches!(
        repo.get_alias(Some("u1"), "https://example.com").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_ignores_other_owners() {
    let repo = MemoryUrlRepository::new();
    repo.add(Some("owner"), common::batch(&[("abc", "https://example.com")]))
        .await
        .unwrap();

    repo.delete_user_urls("intruder", &["abc".to_string()])
        .await
        .unwrap();

    assert_eq!(repo.get_url("abc").await.unwrap(), "https://example.com");
    assert_eq!(repo.get_user_urls("owner").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let repo = MemoryUrlRepository::new();
    repo.add(Some("u1"), common::batch(&[("abc", "https://example.com")]))
        .await
        .unwrap();

    let aliases = vec!["abc".to_string(), "unknown".to_string()];
    repo.delete_user_urls("u1", &aliases).await.unwrap();
    repo.delete_user_urls("u1", &aliases).await.unwrap();

    assert!(matches!(
        repo.get_url("abc").await,
        Err(StorageError::Deleted(_))
    ));
}

#[tokio::test]
async fn test_deleted_alias_cannot_be_reused() {
    let repo = MemoryUrlRepository::new();
    repo.add(Some("u1"), common::batch(&[("abc", "https://example.com")]))
        .await
        .unwrap();
    repo.delete_user_urls("u1", &["abc".to_string()]).await.unwrap();

    let err = repo
        .add(Some("u1"), common::batch(&[("abc", "https://new.example.com")]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::AliasTaken(_)));

    // The URL itself may be shortened again under a new alias.
    repo.add(Some("u1"), common::batch(&[("xyz", "https://example.com")]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_user_store() {
    let repo = MemoryUserRepository::new();

    let alice = repo.create_user(common::new_user("alice", "u-a")).await.unwrap();
    let bob = repo.create_user(common::new_user("bob", "u-b")).await.unwrap();
    assert_ne!(alice.id, bob.id);

    let err = repo
        .create_user(common::new_user("alice", "u-c"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateLogin(ref l) if l == "alice"));

    assert_eq!(repo.find_by_login("bob").await.unwrap(), Some(bob));
    assert_eq!(repo.find_by_login("carol").await.unwrap(), None);
}
