//! Command-line and environment configuration for the dashboard.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::data::dates::DatePolicy;
use crate::data::loader::{LoadOptions, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED};

pub const DEFAULT_DATA_PATH: &str = "Imports_Exports_Dataset.csv";

/// trade-dashboard: filter and chart a table of import/export transactions.
///
/// The source is sampled once at startup with a fixed seed; every filter
/// option shown in the side panel comes from that sample.
#[derive(Debug, Parser, Clone)]
#[command(name = "trade-dashboard", version)]
pub struct Args {
    /// Transactions file (.csv, .tsv, .json or .parquet) with at least the
    /// Category, Import_Export, Value and Date (DD-MM-YYYY) columns.
    #[arg(long, short, env = "TRADE_DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Number of rows to sample from the source.
    #[arg(long, env = "TRADE_DASHBOARD_SAMPLE_SIZE", default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Seed for the row sampler.
    #[arg(long, env = "TRADE_DASHBOARD_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Drop rows whose date does not parse instead of refusing to start.
    #[arg(long)]
    skip_bad_dates: bool,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the env_logger crate for instructions.
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Args {
    pub fn data(&self) -> &PathBuf {
        &self.data
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sample_size: self.sample_size,
            seed: self.seed,
            date_policy: if self.skip_bad_dates {
                DatePolicy::SkipInvalid
            } else {
                DatePolicy::Strict
            },
        }
    }
}
