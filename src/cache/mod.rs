// ABOUTME: Cache module - time-bound storage of tool results.
// ABOUTME: Provides the TTL result cache and the parameter digest used as key.

mod key;
mod result_cache;

pub use key::cache_key;
pub use result_cache::{CacheEntry, ResultCache};
