/// Read-through caching for async lookups.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$fetch`, queues the result for a background write with `$ttl` seconds to
/// live, and returns it. Must be used inside a function returning
/// `AppResult<T>`. A failed cache read is logged and treated as a miss;
/// errors from `$fetch` propagate with `?`.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::BookLookup { title, author }, 3600, self.fetch_volume(&title, &author))
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $fetch:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                ::tracing::warn!(key = %key, error = %e, "Cache read failed, fetching directly");
                None
            }
        };
        if let Some(hit) = hit {
            Ok(hit)
        } else {
            let value = $fetch.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
