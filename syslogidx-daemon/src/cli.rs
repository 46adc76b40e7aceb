//! CLI argument definitions for syslogidx-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments. CLI flags
//! are the last configuration layer: defaults, then the TOML file, then
//! `SYSLOGIDX_*` environment variables, then these flags.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use syslogidx_core::config::SyslogIdxConfig;
use syslogidx_core::error::{ConfigError, SyslogIdxError};

/// Config path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/syslogidx/syslogidx.toml";

/// syslogidx log indexing daemon.
///
/// Receives RFC 5424 syslog over TCP, drains CloudTrail notifications from
/// SQS, and indexes both into dated Elasticsearch indices.
#[derive(Parser, Debug)]
#[command(name = "syslogidx-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to syslogidx.toml configuration file.
    ///
    /// A missing file at the default path falls back to built-in defaults.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable the CloudTrail indexer.
    #[arg(long)]
    pub cloudtrail: bool,

    /// Enable log archiving.
    #[arg(long)]
    pub archive: bool,

    /// Run one retention sweep and exit.
    #[arg(long)]
    pub cleanup: bool,

    /// Number of dated indices to keep (0 disables the periodic sweep).
    #[arg(long)]
    pub retain_days: Option<u32>,

    /// SQS queue name carrying CloudTrail notifications.
    #[arg(long)]
    pub cloudtrail_sqs_queue: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,

    /// Override PID file path (takes precedence over config file).
    #[arg(long)]
    pub pid_file: Option<String>,
}

impl DaemonCli {
    /// Load the layered configuration and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed (other than a
    /// missing file at [`DEFAULT_CONFIG_PATH`]), or if validation fails.
    pub async fn load_config(&self) -> Result<SyslogIdxConfig> {
        let mut config = match SyslogIdxConfig::from_file(&self.config).await {
            Ok(config) => config,
            Err(SyslogIdxError::Config(ConfigError::FileNotFound { .. }))
                if self.config == Path::new(DEFAULT_CONFIG_PATH) =>
            {
                SyslogIdxConfig::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to load config {}: {}",
                    self.config.display(),
                    e
                ));
            }
        };

        config.apply_env_overrides();
        self.apply_overrides(&mut config);
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        Ok(config)
    }

    /// Apply command-line flags on top of `config`.
    ///
    /// Boolean flags only ever switch a component on.
    pub fn apply_overrides(&self, config: &mut SyslogIdxConfig) {
        if self.cloudtrail {
            config.cloudtrail.enabled = true;
        }
        if self.archive {
            config.archive.enabled = true;
        }
        if let Some(days) = self.retain_days {
            config.retention.retain_days = days;
        }
        if let Some(queue) = &self.cloudtrail_sqs_queue {
            config.cloudtrail.queue_name = queue.clone();
        }
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(pid_file) = &self.pid_file {
            config.general.pid_file = pid_file.clone();
        }
    }
}
