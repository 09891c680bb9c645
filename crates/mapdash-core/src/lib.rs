//! Shared types for the market-discovery workspace: geography join keys,
//! slugs, brand records, and application configuration.

mod app_config;
mod config;
pub mod geo_key;
pub mod records;
pub mod slug;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo_key::{builtin_aliases, canonicalize, AliasTable};
pub use records::{BrandRecord, RawBrandRow, RawNumber, RawRtmRow, RtmRecord};
pub use slug::{slugify, widget_id};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read alias file {path}: {source}")]
    AliasFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse alias file: {0}")]
    AliasFileParse(#[source] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
