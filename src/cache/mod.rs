//! Change detection between fetch cycles.

mod change_cache;

pub use change_cache::{CacheEntry, ChangeCache, Revalidation, SkipReason, WriteDecision};
