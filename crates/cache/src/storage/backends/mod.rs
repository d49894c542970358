//! Storage backend implementations

mod lru;
mod memory;

pub use lru::LruStorage;
pub use memory::MemoryStorage;
