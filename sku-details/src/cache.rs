// In-memory cache of completed request results, keyed by request type and the
// request's cache key. Aborted and failed requests are never stored.
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS};
use crate::request::{Request, RequestOutcome, RequestType, Response};
use crate::service::BillingContext;
use moka::sync::Cache;
use std::time::Duration;

pub struct ResultCache {
    cache: Cache<(RequestType, String), Response>,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        ResultCache { cache }
    }

    pub fn get(&self, request_type: RequestType, key: &str) -> Option<Response> {
        let cached = self.cache.get(&(request_type, key.to_string()));
        let metric_def = if cached.is_some() { CACHE_HIT } else { CACHE_MISS };
        crate::counter!(metric_def, "type" => request_type.as_str()).increment(1);
        cached
    }

    pub fn insert(&self, request_type: RequestType, key: String, response: Response) {
        self.cache.insert((request_type, key), response);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// Executes requests, answering repeated equivalent requests from the cache.
pub struct BillingClient {
    context: BillingContext,
    cache: Option<ResultCache>,
}

impl BillingClient {
    pub fn new(context: BillingContext, cache_config: &CacheConfig) -> Self {
        let cache = cache_config.enabled.then(|| ResultCache::new(cache_config));
        Self { context, cache }
    }

    pub async fn execute(&self, request: &Request) -> Result<RequestOutcome<Response>> {
        let cache_entry = self
            .cache
            .as_ref()
            .zip(request.cache_key())
            .map(|(cache, key)| (cache, request.request_type(), key));

        if let Some((cache, request_type, key)) = &cache_entry
            && let Some(response) = cache.get(*request_type, key)
        {
            tracing::debug!(key = %key, "Serving request from cache");
            return Ok(RequestOutcome::Completed(response));
        }

        let outcome = request.execute(&self.context).await?;

        if let (Some((cache, request_type, key)), RequestOutcome::Completed(response)) =
            (cache_entry, &outcome)
        {
            cache.insert(request_type, key, response.clone());
        }

        Ok(outcome)
    }

    /// Drops every cached result, e.g. after the catalog changed.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}
