mod key;
mod query_cache;

pub use key::{QueryFamily, QueryKey};
pub use query_cache::{QueryCache, DEFAULT_CACHE_TIME};
