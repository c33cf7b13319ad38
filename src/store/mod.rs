//! Cache implementations

pub mod memory;

pub use memory::MemoryCache;
