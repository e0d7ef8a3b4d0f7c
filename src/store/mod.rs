//! Persistence backends for the asset ledger and the snapshot history.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;
