//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Local state settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding one JSON file per storage key
    #[arg(long, env = "ELANCART_DATA_DIR", default_value = ".elancart")]
    pub data_dir: PathBuf,
}
