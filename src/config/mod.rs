//! Configuration module for List-Harvest
//!
//! A listing profile is a TOML file describing one listing family: where the
//! pages live, the ordered strategy chains for blocks, fields and pagination,
//! crawl limits, and output destinations.
//!
//! # Example
//!
//! ```no_run
//! use list_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("profiles/cnblogs.toml")).unwrap();
//! println!("Fields: {}", config.fields.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AssetConfig, BlocksConfig, CandidateConfig, CandidateSource, Config, CrawlConfig,
    FieldConfig, FieldKind, OutputConfig, PaginationConfig, PaginationMode, SourceConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
