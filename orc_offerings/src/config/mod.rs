//! Configuration module for the offering scraper
//! Compile-time limits come from the TOML profile selected at build time

// Generated by build.rs from config/<ORC_BUILD_PROFILE>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod error;
pub mod runtime;

pub use error::ConfigError;
pub use runtime::RuntimeConfig;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("ORC_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ORC_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
