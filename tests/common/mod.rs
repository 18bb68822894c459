#![allow(dead_code)]

use sqlx::PgPool;
use std::collections::HashMap;
use shortener_store::config::Config;
use shortener_store::domain::entities::{Alias, NewUser, OriginalUrl};
use shortener_store::infrastructure::persistence::{Storage, schema};
use shortener_store::state::AppState;

pub fn batch(pairs: &[(&str, &str)]) -> HashMap<Alias, OriginalUrl> {
    pairs
        .iter()
        .map(|(alias, url)| (alias.to_string(), url.to_string()))
        .collect()
}

pub fn new_user(login: &str, user_id: &str) -> NewUser {
    NewUser {
        login: login.to_string(),
        password_hash: format!("hash-of-{login}"),
        user_id: user_id.to_string(),
    }
}

pub fn test_config() -> Config {
    Config {
        delete_workers: 4,
        delete_queue_capacity: 1,
        storage_timeout_ms: 2000,
        base_url: "https://sho.rt".to_string(),
        password_secret: Some("test-secret".to_string()),
        ..Config::default()
    }
}

pub fn memory_state() -> AppState {
    AppState::with_storage(Storage::memory(), &test_config())
}

pub async fn file_state(path: &std::path::Path) -> AppState {
    let storage = Storage::file(path).await.unwrap();
    AppState::with_storage(storage, &test_config())
}

pub async fn pg_storage(pool: PgPool) -> Storage {
    schema::init_schema(&pool).await.unwrap();
    Storage::from_pool(pool)
}
