//! Global Configuration Singleton
//!
//! Limits read by the parser and checker. `init` is called once by the
//! binary; library users and tests fall back to the defaults.

use std::sync::OnceLock;

use serde::Serialize;

use crate::models::config::SchemataConfig;

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeConfig {
    pub max_file_size_bytes: u64,
    pub max_path_depth: usize,
    pub max_load_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 5 * 1024 * 1024,
            max_path_depth: 32,
            max_load_depth: 64,
        }
    }
}

impl From<&SchemataConfig> for RuntimeConfig {
    fn from(config: &SchemataConfig) -> Self {
        Self {
            max_file_size_bytes: config.checker.max_file_size_bytes(),
            max_path_depth: config.checker.max_path_depth,
            max_load_depth: config.checker.max_load_depth,
        }
    }
}

pub fn init(config: &SchemataConfig) {
    let _ = CONFIG.set(RuntimeConfig::from(config));
}

pub fn max_file_size_bytes() -> u64 {
    config().max_file_size_bytes
}

pub fn max_path_depth() -> usize {
    config().max_path_depth
}

pub fn max_load_depth() -> usize {
    config().max_load_depth
}

fn config() -> RuntimeConfig {
    CONFIG.get().cloned().unwrap_or_default()
}
