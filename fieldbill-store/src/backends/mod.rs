pub mod memory;

pub use memory::MemoryRequestStore;
