pub mod postgres;
pub mod redis;
pub mod store;

pub use self::postgres::{create_pool, run_migrations};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use self::store::{PgStore, RecommendationStore};
