//! RateCache unit tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use rates_types::{RateError, RepoError, SourceError};

    use crate::cache::{RateCache, RateCacheConfig};
    use crate::test_support::{MockRepo, MockSource, observation};

    type TestCache = RateCache<MockRepo, Arc<MockSource>>;

    fn hourly() -> RateCacheConfig {
        RateCacheConfig {
            staleness_threshold: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(10),
        }
    }

    fn cache_with(repo: MockRepo, source: Arc<MockSource>) -> (Arc<TestCache>, Arc<MockRepo>) {
        let repo = Arc::new(repo);
        let cache = Arc::new(RateCache::new(repo.clone(), source, hourly()));
        (cache, repo)
    }

    #[tokio::test]
    async fn test_empty_store_fetches_and_appends() {
        let source = Arc::new(MockSource::returning(37.5));
        let (cache, repo) = cache_with(MockRepo::new(), source.clone());

        let rate = cache.get_current().await.unwrap();

        assert_eq!(rate.value(), 37.5);
        assert_eq!(source.call_count(), 1);
        assert_eq!(repo.rate_count(), 1);
    }

    #[tokio::test]
    async fn test_fresh_rate_never_fetches() {
        let source = Arc::new(MockSource::returning(99.0));
        let stored = observation(30, 40.0);
        let (cache, _) = cache_with(MockRepo::with_rate(stored), source.clone());

        for _ in 0..5 {
            assert_eq!(cache.get_current().await.unwrap(), stored);
        }

        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_rate_is_refreshed() {
        let source = Arc::new(MockSource::returning(41.0));
        let (cache, repo) = cache_with(MockRepo::with_rate(observation(61, 40.0)), source.clone());

        let rate = cache.get_current().await.unwrap();

        assert_eq!(rate.value(), 41.0);
        assert_eq!(source.call_count(), 1);
        assert_eq!(repo.rate_count(), 2);
    }

    #[tokio::test]
    async fn test_refreshed_rate_is_served_from_store_afterwards() {
        let source = Arc::new(MockSource::returning(41.0));
        let (cache, _) = cache_with(MockRepo::new(), source.clone());

        cache.get_current().await.unwrap();
        source.set_value(50.0);
        let second = cache.get_current().await.unwrap();

        assert_eq!(second.value(), 41.0);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_masked_by_stale_value() {
        let source = Arc::new(MockSource::failing(SourceError::UpstreamUnavailable(
            "connection refused".into(),
        )));
        let (cache, repo) = cache_with(MockRepo::with_rate(observation(120, 40.0)), source.clone());

        let result = cache.get_current().await;

        assert!(matches!(
            result,
            Err(RateError::Source(SourceError::UpstreamUnavailable(_)))
        ));
        assert_eq!(repo.rate_count(), 1);
    }

    #[tokio::test]
    async fn test_next_call_retries_after_failure() {
        let source = Arc::new(MockSource::failing(SourceError::CurrencyNotFound(
            "UAH".into(),
        )));
        let (cache, _) = cache_with(MockRepo::new(), source.clone());

        assert!(cache.get_current().await.is_err());

        source.set_error(None);
        source.set_value(38.0);
        let rate = cache.get_current().await.unwrap();

        assert_eq!(rate.value(), 38.0);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_store_read_failure_is_storage_error() {
        let source = Arc::new(MockSource::returning(37.5));
        let repo = MockRepo::new();
        repo.fail_latest.store(true, Ordering::SeqCst);
        let (cache, _) = cache_with(repo, source.clone());

        let result = cache.get_current().await;

        assert!(matches!(result, Err(RateError::Storage(RepoError::Database(_)))));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_append_failure_is_storage_error() {
        let source = Arc::new(MockSource::returning(37.5));
        let repo = MockRepo::new();
        repo.fail_append.store(true, Ordering::SeqCst);
        let (cache, _) = cache_with(repo, source.clone());

        let result = cache.get_current().await;

        assert!(matches!(result, Err(RateError::Storage(_))));
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_freshness() {
        let source = Arc::new(MockSource::returning(42.0));
        let (cache, repo) = cache_with(MockRepo::with_rate(observation(1, 40.0)), source.clone());

        let rate = cache.force_refresh().await.unwrap();

        assert_eq!(rate.value(), 42.0);
        assert_eq!(source.call_count(), 1);
        assert_eq!(repo.rate_count(), 2);
        assert_eq!(cache.get_current().await.unwrap().value(), 42.0);
    }

    #[tokio::test]
    async fn test_sequential_force_refreshes_each_fetch() {
        let source = Arc::new(MockSource::returning(42.0));
        let (cache, _) = cache_with(MockRepo::new(), source.clone());

        cache.force_refresh().await.unwrap();
        cache.force_refresh().await.unwrap();

        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_on_empty_store_fetch_once() {
        let source = Arc::new(MockSource::returning(37.5).with_delay(Duration::from_millis(100)));
        let (cache, repo) = cache_with(MockRepo::new(), source.clone());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_current().await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(source.call_count(), 1);
        assert_eq!(repo.rate_count(), 1);
        assert!(results.iter().all(|r| *r == results[0]));
        assert_eq!(results[0].value(), 37.5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_on_stale_store_fetch_once() {
        let source = Arc::new(MockSource::returning(41.0).with_delay(Duration::from_millis(100)));
        let (cache, _) = cache_with(MockRepo::with_rate(observation(600, 40.0)), source.clone());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_current().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().value(), 41.0);
        }
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_failure() {
        let source = Arc::new(
            MockSource::failing(SourceError::MalformedResponse("bad json".into()))
                .with_delay(Duration::from_millis(100)),
        );
        let (cache, _) = cache_with(MockRepo::new(), source.clone());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_current().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(
                handle.await.unwrap(),
                Err(RateError::Source(SourceError::MalformedResponse(
                    "bad json".into()
                )))
            );
        }
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_join_in_flight_force_refresh() {
        let source = Arc::new(MockSource::returning(45.0).with_delay(Duration::from_millis(200)));
        let (cache, _) = cache_with(MockRepo::new(), source.clone());

        let forced = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.force_refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let reader = cache.get_current().await.unwrap();

        assert_eq!(forced.await.unwrap().unwrap(), reader);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upstream_times_out() {
        let source = Arc::new(MockSource::returning(37.5).with_delay(Duration::from_secs(3600)));
        let (cache, repo) = cache_with(MockRepo::new(), source.clone());

        let result = cache.get_current().await;

        assert!(matches!(
            result,
            Err(RateError::Source(SourceError::UpstreamUnavailable(msg))) if msg.contains("10s")
        ));
        assert_eq!(repo.rate_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_released_after_timeout() {
        let source = Arc::new(MockSource::returning(37.5).with_delay(Duration::from_secs(3600)));
        let (cache, _) = cache_with(MockRepo::new(), source.clone());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_current().await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = RateCacheConfig::default();
        assert_eq!(config.staleness_threshold, Duration::from_secs(86_400));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    }
}
