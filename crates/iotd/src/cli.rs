use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use iotd_core::ServerSettings;

/// iotd: IoT data server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server settings file (.json, .yaml, .yml or .toml)
    #[arg(long, short = 'c')]
    pub config: PathBuf,

    /// Force test mode on every configured getter
    #[arg(long)]
    pub test_mode: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Start, wait, print every node, then stop
    #[arg(long)]
    pub once: bool,

    /// How long `--once` lets the getters run before dumping
    #[arg(long, default_value_t = 500)]
    pub dump_after_ms: u64,

    /// Output format of the `--once` dump
    #[arg(long, value_enum, default_value_t = DumpFormat::Json)]
    pub format: DumpFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Json,
    Markup,
}

impl CliArgs {
    /// Apply command-line overrides on top of the loaded settings
    pub fn apply_overrides(&self, settings: &mut ServerSettings) {
        if self.test_mode {
            for getter in &mut settings.getters {
                getter.test_mode = true;
            }
        }
    }
}
