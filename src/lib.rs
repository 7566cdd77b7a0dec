//! toolshelf: searchable AI tool catalog with an LLM assistant.
//!
//! This library crate re-exports modules so integration tests
//! (under `tests/`) can access them.

pub mod assistant;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod gateway;
pub mod ingest;
pub mod models;
pub mod utils;

/// Return the toolshelf home directory.
///
/// Resolution order:
/// 1. `TOOLSHELF_HOME` environment variable
/// 2. `$HOME/.toolshelf`
pub fn toolshelf_home() -> std::path::PathBuf {
    if let Ok(p) = std::env::var("TOOLSHELF_HOME") {
        std::path::PathBuf::from(p)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".toolshelf")
    }
}
