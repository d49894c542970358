//! Storage backends for the cache engine
//!
//! A backend is a plain key to entry mapping. It never locks: the cache
//! calls it from inside its own critical section. Backends are picked at
//! construction time through [`StorageKind`].

mod backends;
mod factory;
mod traits;

pub use backends::{LruStorage, MemoryStorage};
pub use factory::{create_storage, StorageKind};
pub use traits::Storage;
