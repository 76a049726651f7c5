pub mod json_file;
pub mod memory;

pub use json_file::{JsonFileStore, DEFAULT_STATE_FILE};
pub use memory::MemoryStore;
