//! Behavioural tests for `CredentialStore` against in-memory doubles.

mod common;

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{setup_test_logging, FailingCache, ManualClockCache, MemoryUserMetaStore};
use token_auth_keys::domain::models::{PUBLIC_KEY_META_KEY, TOTAL_COUNT_CACHE_KEY};
use token_auth_keys::services::{sha256_hex, CredentialStore, CredentialStoreSettings, EMPTY_TOKEN};
use token_auth_keys::{CredentialError, StoreError, UserId};

fn settings(key_ttl: u64, count_ttl: u64) -> CredentialStoreSettings {
    CredentialStoreSettings {
        key_ttl: Duration::from_secs(key_ttl),
        count_ttl: Duration::from_secs(count_ttl),
    }
}

fn fixture() -> (Arc<MemoryUserMetaStore>, Arc<ManualClockCache>, CredentialStore) {
    setup_test_logging();
    let store = Arc::new(MemoryUserMetaStore::new());
    let cache = Arc::new(ManualClockCache::new());
    let credentials = CredentialStore::with_settings(store.clone(), cache.clone(), settings(3600, 3600));
    (store, cache, credentials)
}

#[tokio::test]
async fn test_user_without_keys_gets_empty_values() {
    let (store, _cache, credentials) = fixture();
    store.add_user(5);
    let user = UserId::new(5);

    assert_eq!(credentials.get_public_key(user).await.unwrap(), "");
    assert_eq!(credentials.get_secret_key(user).await.unwrap(), "");
    assert_eq!(credentials.get_token(user).await.unwrap(), EMPTY_TOKEN);
    assert_eq!(
        EMPTY_TOKEN,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[tokio::test]
async fn test_token_is_digest_of_secret_then_public() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");

    let token = credentials.get_token(UserId::new(42)).await.unwrap();
    assert_eq!(token, sha256_hex(b"SK1PK1"));
    assert_ne!(token, sha256_hex(b"PK1SK1"));
}

#[tokio::test]
async fn test_repeated_reads_within_ttl_hit_cache() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");
    let user = UserId::new(42);

    for _ in 0..5 {
        assert_eq!(credentials.get_public_key(user).await.unwrap(), "PK1");
    }
    assert_eq!(store.meta_reads(), 1);

    // Tokens come from the cached keys, not a second store round trip
    credentials.get_token(user).await.unwrap();
    credentials.get_token(user).await.unwrap();
    assert_eq!(store.meta_reads(), 2);
}

#[tokio::test]
async fn test_expired_entry_is_reread_and_sees_rotation() {
    let (store, cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");
    let user = UserId::new(42);

    assert_eq!(credentials.get_public_key(user).await.unwrap(), "PK1");
    store.set_meta(42, PUBLIC_KEY_META_KEY, "PK2");

    // Still inside the TTL: the stale value is served
    cache.advance(Duration::from_secs(3599));
    assert_eq!(credentials.get_public_key(user).await.unwrap(), "PK1");
    assert_eq!(store.meta_reads(), 1);

    cache.advance(Duration::from_secs(2));
    assert_eq!(credentials.get_public_key(user).await.unwrap(), "PK2");
    assert_eq!(store.meta_reads(), 2);
}

#[tokio::test]
async fn test_invalidate_user_drops_both_keys() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");
    let user = UserId::new(42);

    let before = credentials.get_token(user).await.unwrap();
    store.set_meta(42, PUBLIC_KEY_META_KEY, "PK2");
    assert_eq!(credentials.get_token(user).await.unwrap(), before);

    credentials.invalidate_user(user).await;
    assert_eq!(credentials.get_token(user).await.unwrap(), sha256_hex(b"SK1PK2"));
    assert_eq!(store.meta_reads(), 4);
}

#[tokio::test]
async fn test_empty_values_are_not_cached() {
    let (store, cache, credentials) = fixture();
    store.add_user(9);
    let user = UserId::new(9);

    assert_eq!(credentials.get_public_key(user).await.unwrap(), "");
    assert_eq!(cache.len(), 0);

    // A key issued afterwards is visible immediately
    store.set_meta(9, PUBLIC_KEY_META_KEY, "fresh");
    assert_eq!(credentials.get_public_key(user).await.unwrap(), "fresh");
    assert_eq!(store.meta_reads(), 2);
}

#[tokio::test]
async fn test_pages_cover_all_users_without_overlap() {
    let (store, _cache, credentials) = fixture();
    for id in 1..=65 {
        store.add_credentialed(id, &format!("pk{id}"), &format!("sk{id}"));
    }
    // Users without the marker never appear
    store.add_user(1000);

    let mut seen = Vec::new();
    for page_number in 1..=3 {
        let page = credentials.list_page(page_number, 30).await.unwrap();
        assert!(page.len() <= 30);
        assert_eq!(page.total_count, 65);
        assert_eq!(page.total_pages(), 3);
        seen.extend(page.records.iter().map(|c| c.user_id.as_u64()));
    }

    assert_eq!(seen, (1..=65).collect::<Vec<_>>());
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 65);
}

#[tokio::test]
async fn test_second_page_starts_at_offset() {
    let (store, _cache, credentials) = fixture();
    for id in [3, 1, 7, 5, 9] {
        store.add_credentialed(id, "pk", "sk");
    }

    let first = credentials.list_page(1, 2).await.unwrap();
    let second = credentials.list_page(2, 2).await.unwrap();
    let ids = |page: &token_auth_keys::CredentialListPage| {
        page.records.iter().map(|c| c.user_id.as_u64()).collect::<Vec<_>>()
    };

    assert_eq!(ids(&first), vec![1, 3]);
    assert_eq!(ids(&second), vec![5, 7]);
}

#[tokio::test]
async fn test_records_carry_identity_keys_and_token() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");

    let page = credentials.list_page(1, 30).await.unwrap();
    let record = &page.records[0];
    assert_eq!(record.login, "user42");
    assert_eq!(record.email, "user42@example.com");
    assert_eq!(record.public_key, "PK1");
    assert_eq!(record.secret_key, "SK1");
    assert_eq!(record.token, sha256_hex(b"SK1PK1"));
    assert!(record.is_complete());
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(1, "pk", "sk");

    let page = credentials.list_page(5, 30).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page_number, 5);
}

#[tokio::test]
async fn test_invalid_page_requests_are_rejected() {
    let (_store, _cache, credentials) = fixture();

    assert!(matches!(
        credentials.list_page(0, 30).await,
        Err(CredentialError::InvalidPageRequest { .. })
    ));
    assert!(matches!(
        credentials.list_page(1, 0).await,
        Err(CredentialError::InvalidPageRequest { .. })
    ));
}

#[tokio::test]
async fn test_count_is_cached_until_ttl() {
    setup_test_logging();
    let store = Arc::new(MemoryUserMetaStore::new());
    let cache = Arc::new(ManualClockCache::new());
    let credentials = CredentialStore::with_settings(store.clone(), cache.clone(), settings(3600, 60));

    store.add_credentialed(1, "pk", "sk");
    store.add_credentialed(2, "pk", "sk");
    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 2);
    assert!(cache.contains(TOTAL_COUNT_CACHE_KEY));

    store.add_credentialed(3, "pk", "sk");
    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 2);
    assert_eq!(store.counts(), 1);

    cache.advance(Duration::from_secs(61));
    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 3);
    assert_eq!(store.counts(), 2);
}

#[tokio::test]
async fn test_invalidate_count_forces_recount() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(1, "pk", "sk");
    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 1);

    store.add_credentialed(2, "pk", "sk");
    credentials.invalidate_count().await;
    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 2);
}

#[tokio::test]
async fn test_zero_count_is_not_cached() {
    let (store, cache, credentials) = fixture();

    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 0);
    assert!(!cache.contains(TOTAL_COUNT_CACHE_KEY));

    store.add_credentialed(1, "pk", "sk");
    assert_eq!(credentials.total_credentialed_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_cache_failures_fall_back_to_store() {
    setup_test_logging();
    let store = Arc::new(MemoryUserMetaStore::new());
    let cache = Arc::new(FailingCache::default());
    let credentials = CredentialStore::new(store.clone(), cache.clone());
    store.add_credentialed(42, "PK1", "SK1");

    assert_eq!(credentials.get_token(UserId::new(42)).await.unwrap(), sha256_hex(b"SK1PK1"));
    assert_eq!(credentials.get_token(UserId::new(42)).await.unwrap(), sha256_hex(b"SK1PK1"));
    let page = credentials.list_page(1, 30).await.unwrap();
    assert_eq!(page.total_count, 1);

    credentials.invalidate_user(UserId::new(42)).await;
    credentials.invalidate_count().await;

    // Every read went to the store
    assert_eq!(store.meta_reads(), 6);
    assert!(cache.attempts.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn test_store_unavailable_propagates() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");
    store.set_unavailable(true);

    assert!(matches!(
        credentials.get_public_key(UserId::new(42)).await,
        Err(CredentialError::StoreUnavailable(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        credentials.list_page(1, 30).await,
        Err(CredentialError::StoreUnavailable(_))
    ));
    assert!(matches!(
        credentials.total_credentialed_users().await,
        Err(CredentialError::StoreUnavailable(_))
    ));

    // No retries
    assert_eq!(store.meta_reads(), 1);
    assert_eq!(store.counts(), 1);
}

#[tokio::test]
async fn test_cached_keys_survive_store_outage() {
    let (store, _cache, credentials) = fixture();
    store.add_credentialed(42, "PK1", "SK1");
    let user = UserId::new(42);

    credentials.get_token(user).await.unwrap();
    store.set_unavailable(true);
    assert_eq!(credentials.get_token(user).await.unwrap(), sha256_hex(b"SK1PK1"));
}

#[tokio::test]
async fn test_get_credential_reports_partial_pair() {
    let (store, _cache, credentials) = fixture();
    store.add_user(8);
    store.set_meta(8, PUBLIC_KEY_META_KEY, "lonely");

    let credential = credentials.get_credential(UserId::new(8)).await.unwrap().unwrap();
    assert_eq!(credential.public_key, "lonely");
    assert_eq!(credential.secret_key, "");
    assert!(!credential.is_complete());
    assert_eq!(credential.token, sha256_hex(b"lonely"));
}
