use crate::infrastructure::{FileStore, KeyValueStore, MemoryStore};
use clap::Parser;
use std::path::PathBuf;

/// Command line and environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal user registration desk", long_about = None)]
pub struct Config {
    /// Directory holding the stored records
    #[arg(long, env = "REGDESK_DATA_DIR", default_value = "regdesk-data")]
    pub data_dir: PathBuf,

    /// Keep records in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,

    /// File receiving log output (the terminal is taken by the UI)
    #[arg(long, env = "REGDESK_LOG_FILE", default_value = "regdesk.log")]
    pub log_file: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn open_store(&self) -> Box<dyn KeyValueStore> {
        if self.ephemeral {
            Box::new(MemoryStore::new())
        } else {
            Box::new(FileStore::new(self.data_dir.clone()))
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> String {
        format!("warn,regdesk={}", self.log_level)
    }
}
