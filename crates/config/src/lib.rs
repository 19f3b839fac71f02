//! Process-wide configuration: schema, discovery, and loading.
//!
//! Configuration is an explicit immutable value passed to each component
//! at construction — nothing here is ambient global state.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{DatabaseConfig, RelaydeskConfig, ServerConfig},
};
