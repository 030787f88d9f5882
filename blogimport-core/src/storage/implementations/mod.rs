//! Storage implementations

pub mod fs;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
