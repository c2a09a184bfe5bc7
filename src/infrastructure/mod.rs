//! Infrastructure layer - caches, providers, resolvers, rate limiting,
//! logging, and the batch backfill job

pub mod backfill;
pub mod cache;
pub mod logging;
pub mod providers;
pub mod rate_limit;
pub mod resolver;
