//! Cache infrastructure - memory tier, Postgres tier, and the tiered store

mod memory;
mod postgres;
mod store;

pub use memory::MemoryCache;
pub use postgres::PostgresCacheRepository;
pub use store::{PersistentCache, TieredCacheStore};
