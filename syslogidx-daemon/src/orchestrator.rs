//! Component assembly and lifecycle management.
//!
//! The [`Orchestrator`] is the central coordinator of `syslogidx-daemon`.
//! It builds the shared Elasticsearch client, wires it into every enabled
//! component, and drives them through the plugin lifecycle.
//!
//! # Components (registration order)
//!
//! 1. Syslog listener (`[syslog]`)
//! 2. CloudTrail indexer (`[cloudtrail]`, needs AWS credentials)
//! 3. Retention sweep (`[retention]`)
//!
//! Startup and shutdown both follow registration order. Any startup failure
//! is fatal: already-started components are stopped and the error is
//! returned to `main`, which exits non-zero.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use syslogidx_aws::{Credentials, S3, Sqs};
use syslogidx_cloudtrail::{CloudTrailIndexer, IndexerConfig};
use syslogidx_core::config::SyslogIdxConfig;
use syslogidx_core::plugin::PluginRegistry;
use syslogidx_elastic::ElasticSearch;
use syslogidx_retention::{RetentionSweep, SweepConfig, SweepReport, sweep};
use syslogidx_syslog::{ListenerConfig, SyslogListener};

use crate::health::{DaemonHealth, ModuleHealth, aggregate_status};
use crate::metrics_server;
use crate::pid_file::PidFile;

/// How often the main loop logs aggregated health.
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// How often the uptime gauge is refreshed.
const UPTIME_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: SyslogIdxConfig,
    /// Registry of all components (ordered for start/stop).
    plugins: PluginRegistry,
    /// Shutdown broadcast sender for background tasks.
    shutdown_tx: broadcast::Sender<()>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
    pid_file: Option<PidFile>,
    uptime_task: Option<JoinHandle<()>>,
}

impl Orchestrator {
    /// Build from an already-loaded configuration.
    ///
    /// Constructs clients and registers components; nothing is bound or
    /// contacted until [`start`](Self::start).
    pub async fn build_from_config(config: SyslogIdxConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        if config.archive.enabled {
            tracing::warn!(
                region = %config.aws.region,
                "archive is enabled but log archiving is not available in this build; ignoring"
            );
        }

        let backend = Arc::new(
            ElasticSearch::from_config(&config.elasticsearch)
                .map_err(|e| anyhow::anyhow!("failed to build Elasticsearch client: {}", e))?,
        );
        tracing::info!(endpoint = %backend.endpoint(), "Elasticsearch backend configured");

        let mut plugins = PluginRegistry::new();

        if config.syslog.enabled {
            tracing::info!(bind = %config.syslog.bind, "initializing syslog listener");
            let listener_config = ListenerConfig::from_core(&config.syslog);
            plugins.register(Box::new(SyslogListener::new(
                listener_config,
                Arc::clone(&backend),
            )))?;
        }

        if config.cloudtrail.enabled {
            tracing::info!(
                queue = %config.cloudtrail.queue_name,
                region = %config.aws.region,
                "initializing CloudTrail indexer"
            );
            let credentials = Credentials::from_env()
                .map_err(|e| anyhow::anyhow!("failed to load AWS credentials: {}", e))?;
            let sqs = Sqs::from_config(&config.aws, credentials.clone())
                .map_err(|e| anyhow::anyhow!("failed to build SQS client: {}", e))?;
            let s3 = S3::from_config(&config.aws, credentials)
                .map_err(|e| anyhow::anyhow!("failed to build S3 client: {}", e))?;
            let indexer = CloudTrailIndexer::new(
                IndexerConfig::from_core(&config.cloudtrail),
                Arc::new(sqs),
                Arc::new(s3),
                Arc::clone(&backend),
            );
            plugins.register(Box::new(indexer))?;
        }

        if config.retention.enabled {
            tracing::info!(
                retain_days = config.retention.retain_days,
                "initializing retention sweep"
            );
            let sweep = RetentionSweep::new(
                SweepConfig::from_core(&config.retention),
                Arc::clone(&backend),
            );
            plugins.register(Box::new(sweep))?;
        }

        if plugins.count() == 0 {
            tracing::warn!("no components enabled; the daemon will idle until stopped");
        }
        tracing::info!(total_plugins = plugins.count(), "orchestrator initialized");

        if config.metrics.enabled {
            record_daemon_metrics(plugins.count());
        }

        let (shutdown_tx, _) = broadcast::channel(4);
        Ok(Self {
            config,
            plugins,
            shutdown_tx,
            start_time: Instant::now(),
            pid_file: None,
            uptime_task: None,
        })
    }

    /// Start all components and block until SIGTERM or SIGINT, then shut
    /// down.
    pub async fn run(&mut self) -> Result<()> {
        self.start().await?;

        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);
        let mut health_tick = tokio::time::interval(HEALTH_CHECK_INTERVAL);
        health_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // the first tick completes immediately
        health_tick.tick().await;

        tracing::info!("entering main event loop");
        let signal = loop {
            tokio::select! {
                signal = &mut shutdown => break signal,
                _ = health_tick.tick() => self.log_health().await,
            }
        };

        match signal {
            Ok(signal) => {
                tracing::info!(signal, "shutdown signal received");
                self.shutdown().await
            }
            Err(e) => {
                let _ = self.shutdown().await;
                Err(e)
            }
        }
    }

    /// Write the PID file, then initialize and start every component.
    ///
    /// On failure the components that did start are stopped again and the
    /// PID file is removed.
    pub async fn start(&mut self) -> Result<()> {
        if !self.config.general.pid_file.is_empty() {
            self.pid_file = Some(PidFile::create(&self.config.general.pid_file)?);
        }

        tracing::info!("initializing all plugins");
        if let Err(e) = self.plugins.init_all().await {
            tracing::error!(error = %e, "plugin initialization failed");
            self.pid_file = None;
            return Err(e.into());
        }

        tracing::info!("starting all plugins");
        if let Err(e) = self.plugins.start_all().await {
            tracing::warn!("startup failed, rolling back already-started plugins");
            if let Err(stop_err) = self.plugins.stop_all().await {
                tracing::error!(
                    startup_error = %e,
                    rollback_error = %stop_err,
                    "rollback also failed during startup failure cleanup"
                );
            }
            self.pid_file = None;
            return Err(e.into());
        }

        if self.config.metrics.enabled {
            self.uptime_task = Some(spawn_uptime_updater(
                self.start_time,
                self.shutdown_tx.subscribe(),
            ));
        }

        tracing::info!(
            plugins = ?self.plugin_names(),
            version = env!("CARGO_PKG_VERSION"),
            "syslogidx-daemon running"
        );
        Ok(())
    }

    /// Stop background tasks and all components, then remove the PID file.
    pub async fn shutdown(&mut self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        if let Some(task) = self.uptime_task.take() {
            let _ = task.await;
        }

        tracing::info!("stopping all plugins");
        let result = self.plugins.stop_all().await.map_err(Into::into);
        self.pid_file = None;
        result
    }

    /// Get the current aggregated health status.
    pub async fn health(&self) -> DaemonHealth {
        let modules: Vec<ModuleHealth> = self
            .plugins
            .health_check_all()
            .await
            .into_iter()
            .map(|(name, _state, status)| ModuleHealth {
                name,
                enabled: true,
                status,
            })
            .collect();

        DaemonHealth {
            status: aggregate_status(&modules),
            uptime_secs: self.start_time.elapsed().as_secs(),
            modules,
        }
    }

    /// Names of the registered components, in start order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins
            .list()
            .into_iter()
            .map(|info| info.name.clone())
            .collect()
    }

    async fn log_health(&self) {
        let health = self.health().await;
        if health.status.is_healthy() {
            tracing::debug!(uptime_secs = health.uptime_secs, "all components healthy");
        } else {
            tracing::warn!(
                status = ?health.status,
                uptime_secs = health.uptime_secs,
                "daemon health degraded"
            );
        }
    }
}

/// Run a single retention sweep against the configured cluster.
///
/// Used by `--cleanup`. The returned report may contain listing or delete
/// failures; those are logged by the sweep and do not make this an error.
///
/// # Errors
///
/// Fails if `retention.retain_days` is 0 (which would delete every dated
/// index) or the Elasticsearch client cannot be built.
pub async fn run_cleanup(config: &SyslogIdxConfig) -> Result<SweepReport> {
    let retain_days = config.retention.retain_days;
    if retain_days == 0 {
        return Err(anyhow::anyhow!(
            "refusing to run cleanup with retain_days = 0"
        ));
    }

    let backend = ElasticSearch::from_config(&config.elasticsearch)
        .map_err(|e| anyhow::anyhow!("failed to build Elasticsearch client: {}", e))?;
    tracing::info!(retain_days, endpoint = %backend.endpoint(), "running one-shot cleanup");
    Ok(sweep(&backend, retain_days).await)
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Record build info and the registered component count.
fn record_daemon_metrics(plugin_count: usize) {
    use syslogidx_core::metrics as m;

    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    #[allow(clippy::cast_precision_loss)]
    metrics::gauge!(m::DAEMON_PLUGINS_REGISTERED).set(plugin_count as f64);
}

/// Spawn a background task that keeps the uptime gauge fresh.
fn spawn_uptime_updater(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    use syslogidx_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPTIME_UPDATE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS)
                        .set(start_time.elapsed().as_secs() as f64);
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}
