//! Configuration loading
//!
//! Reads [`busysync_domain::AppConfig`] from TOML or JSON files and applies
//! environment overrides.

pub mod loader;

pub use loader::{
    apply_env_overrides, load, load_from_file, probe_config_paths, resolve_config_path,
};
