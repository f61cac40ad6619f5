//! Response Cache and Dispatch Queue: the two concurrency primitives sitting between
//! the Proxy Controller and the upstream client.

pub mod cache;
pub mod queue;

pub use cache::{fingerprint, CacheStats, ResponseCache, DEFAULT_TTL};
pub use queue::{DispatchPermit, DispatchQueue};
