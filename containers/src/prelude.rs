pub use super::erased_storage::*;
pub use super::idle_map::IdleExpiryMap;
pub use dashmap;
