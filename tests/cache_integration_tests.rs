//! Integration Tests for the Cache Handle
//!
//! Exercises the public façade end-to-end: the shared handle, the
//! periodic GC task it arms, and the diagnostics snapshot.

use std::sync::Arc;
use std::time::Duration;

use local_cache::{CacheConfig, Expiration, LocalCache, ManualClock};
use serde_json::Value;

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "local_cache=debug".into()),
        )
        .try_init();
}

/// A cache whose GC cycle never fires during a test, driven by a manual
/// clock so TTL arithmetic is deterministic.
fn manual_cache(config: CacheConfig) -> (LocalCache<String>, Arc<ManualClock>) {
    let clock = ManualClock::shared(50_000);
    let cache = LocalCache::with_clock(config, clock.clone());
    (cache, clock)
}

// == Basic Operation Tests ==

#[tokio::test]
async fn test_add_get_set_del_round_trip() {
    let (cache, _) = manual_cache(CacheConfig::default());

    let added = cache.add("key1", "first".to_string(), None, false).await;
    assert_eq!(added, "first");

    // add never overwrites
    let added_again = cache.add("key1", "second".to_string(), None, false).await;
    assert_eq!(added_again, "first");

    // set always does
    let set = cache.set("key1", "third".to_string(), Some(30)).await;
    assert_eq!(set, "third");
    assert_eq!(cache.get("key1").await, Some("third".to_string()));

    assert_eq!(cache.del("key1").await, Some("third".to_string()));
    assert_eq!(cache.get("key1").await, None);

    cache.shutdown();
}

#[tokio::test]
async fn test_touch_rearms_expiration() {
    let (cache, clock) = manual_cache(CacheConfig::default());

    cache.add("key1", "value".to_string(), Some(5), false).await;
    clock.advance(2);
    cache.touch("key1", Some(10)).await;

    assert_eq!(
        cache.get_expiration_time("key1").await,
        Some(Expiration::At(50_000 + 2 + 10))
    );

    cache.shutdown();
}

#[tokio::test]
async fn test_get_touch_combines_read_and_renewal() {
    let (cache, _) = manual_cache(CacheConfig::default());

    cache.add("key1", "value".to_string(), Some(5), false).await;
    let value = cache.get_touch("key1", None).await;

    assert_eq!(value, Some("value".to_string()));
    assert_eq!(
        cache.get_expiration_time("key1").await,
        Some(Expiration::Never)
    );

    cache.shutdown();
}

#[tokio::test]
async fn test_expiration_time_three_way() {
    let (cache, _) = manual_cache(CacheConfig::default());

    cache.add("mortal", "a".to_string(), Some(30), false).await;
    cache.add("eternal", "b".to_string(), None, false).await;

    assert_eq!(
        cache.get_expiration_time("mortal").await,
        Some(Expiration::At(50_030))
    );
    assert_eq!(
        cache.get_expiration_time("eternal").await,
        Some(Expiration::Never)
    );
    assert_eq!(cache.get_expiration_time("missing").await, None);

    cache.shutdown();
}

#[tokio::test]
async fn test_flush_reports_empty_diagnostics() {
    let (cache, _) = manual_cache(CacheConfig::default());

    cache.add("key1", "value".to_string(), Some(30), false).await;
    cache.add("key2", "value".to_string(), None, false).await;
    cache.flush().await;

    let diagnostics = cache.diagnostics().await;
    assert_eq!(diagnostics.keys, 0);
    assert_eq!(diagnostics.expiration_blocks, 0);
    assert_eq!(cache.get("key1").await, None);
    assert_eq!(cache.get("key2").await, None);

    cache.shutdown();
}

#[tokio::test]
async fn test_aggressive_expiration_end_to_end() {
    let config = CacheConfig {
        resolution: 60,
        max_keys: None,
        aggressive_expiration: true,
    };
    let (cache, clock) = manual_cache(config);

    cache.add("key1", "value".to_string(), Some(2), false).await;
    assert_eq!(cache.get("key1").await, Some("value".to_string()));

    // No GC cycle fires at this resolution; the read path alone expires it
    clock.advance(3);
    assert_eq!(cache.get("key1").await, None);

    cache.shutdown();
}

#[tokio::test]
async fn test_max_keys_ceiling_through_handle() {
    let config = CacheConfig {
        resolution: 60,
        max_keys: Some(2),
        aggressive_expiration: false,
    };
    let (cache, _) = manual_cache(config);

    cache.add("k1", "v".to_string(), Some(30), false).await;
    cache.add("k2", "v".to_string(), Some(30), false).await;
    cache.add("k3", "v".to_string(), Some(30), false).await;

    let diagnostics = cache.diagnostics().await;
    assert!(diagnostics.keys <= 2);
    assert_eq!(cache.get("k3").await, Some("v".to_string()));

    cache.shutdown();
}

// == Diagnostics Serialization ==

#[tokio::test]
async fn test_diagnostics_snapshot_serializes() {
    let (cache, _) = manual_cache(CacheConfig::new(3));

    cache.add("key1", "value".to_string(), Some(2), false).await;

    let diagnostics = cache.diagnostics().await;
    let json: Value = serde_json::to_value(&diagnostics).unwrap();

    assert_eq!(json["keys"], 1);
    assert_eq!(json["resolution"], 3);
    assert_eq!(json["next_expiration"]["keys"], 1);
    assert_eq!(json["next_expiration"]["time"], 50_003);

    cache.shutdown();
}

// == GC Schedule Tests ==
// These run against the system clock with a one-second resolution, the
// same way the scheduler runs in production.

#[tokio::test]
async fn test_scheduled_gc_retires_expired_entries() {
    init_tracing();

    let cache: LocalCache<String> = LocalCache::new(CacheConfig::new(1));

    cache
        .add("expire_soon", "value".to_string(), Some(1), false)
        .await;
    cache
        .add("long_lived", "value".to_string(), Some(3_600), false)
        .await;

    // The owning bucket is retired within three cycles
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    assert_eq!(cache.get("expire_soon").await, None);
    assert_eq!(cache.get("long_lived").await, Some("value".to_string()));

    cache.shutdown();
}

#[tokio::test]
async fn test_shutdown_cancels_pending_cycles() {
    let cache: LocalCache<String> = LocalCache::new(CacheConfig::new(1));

    cache
        .add("stale", "value".to_string(), Some(1), false)
        .await;
    cache.shutdown();

    tokio::time::sleep(Duration::from_millis(2_500)).await;

    // No cycle ran after shutdown, so the logically-expired entry is
    // still served (lazy expiration is the default)
    assert_eq!(cache.get("stale").await, Some("value".to_string()));
}

#[tokio::test]
async fn test_clones_share_one_store() {
    let (cache, _) = manual_cache(CacheConfig::default());
    let other = cache.clone();

    cache.add("key1", "value".to_string(), None, false).await;
    assert_eq!(other.get("key1").await, Some("value".to_string()));

    other.del("key1").await;
    assert_eq!(cache.get("key1").await, None);

    cache.shutdown();
}
