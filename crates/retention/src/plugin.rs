//! 주기적 보존 정책 스윕 플러그인
//!
//! 여러 프로세스가 같은 클러스터를 정리할 수 있으므로 첫 스윕 전에
//! `[0, max_jitter)` 범위의 무작위 지연을 둡니다.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use syslogidx_core::backend::IndexBackend;
use syslogidx_core::error::SyslogIdxError;
use syslogidx_core::pipeline::HealthStatus;
use syslogidx_core::plugin::{Plugin, PluginInfo, PluginState, PluginType};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::SweepConfig;
use crate::sweep::{SweepReport, sweep};

/// 플러그인 이름
pub const PLUGIN_NAME: &str = "retention-sweep";

/// 주기적 보존 정책 스윕
pub struct RetentionSweep<B: IndexBackend> {
    info: PluginInfo,
    state: PluginState,
    config: SweepConfig,
    backend: Arc<B>,
    last_report: Arc<Mutex<Option<SweepReport>>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<B: IndexBackend> RetentionSweep<B> {
    pub fn new(config: SweepConfig, backend: Arc<B>) -> Self {
        Self {
            info: PluginInfo::new(
                PLUGIN_NAME,
                "Deletes dated indices beyond the retention window",
                PluginType::Maintenance,
            ),
            state: PluginState::Created,
            config,
            backend,
            last_report: Arc::new(Mutex::new(None)),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// 가장 최근 스윕 결과
    pub fn last_report(&self) -> Option<SweepReport> {
        self.last_report
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl<B: IndexBackend> Plugin for RetentionSweep<B> {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn state(&self) -> PluginState {
        self.state
    }

    async fn init(&mut self) -> Result<(), SyslogIdxError> {
        self.state.ensure(&self.info.name, &[PluginState::Created])?;
        if let Err(e) = self.config.validate() {
            self.state = PluginState::Failed;
            return Err(e.into());
        }
        self.state = PluginState::Initialized;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), SyslogIdxError> {
        self.state
            .ensure(&self.info.name, &[PluginState::Initialized])?;

        if self.config.is_periodic() {
            let jitter = pick_jitter(self.config.max_jitter);
            info!(
                retain_days = self.config.retain_days,
                first_run_in_secs = jitter.as_secs(),
                interval_secs = self.config.interval.as_secs(),
                "retention sweep scheduled"
            );
            self.task = Some(tokio::spawn(run(
                Arc::clone(&self.backend),
                self.config.clone(),
                jitter,
                Arc::clone(&self.last_report),
                self.cancel.clone(),
            )));
        } else {
            info!("retain_days is 0, periodic retention sweep disabled");
        }

        self.state = PluginState::Running;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SyslogIdxError> {
        self.state.ensure(&self.info.name, &[PluginState::Running])?;

        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        self.state = PluginState::Stopped;
        info!("retention sweep stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        if self.state != PluginState::Running {
            return HealthStatus::Unhealthy(self.state.to_string());
        }
        if let Some(task) = &self.task {
            if task.is_finished() {
                return HealthStatus::Unhealthy("sweep loop exited".to_owned());
            }
        }
        match self.last_report() {
            Some(report) if report.listing_error.is_some() => {
                HealthStatus::Degraded("last retention sweep could not list indices".to_owned())
            }
            Some(report) if !report.failed.is_empty() => HealthStatus::Degraded(format!(
                "last retention sweep failed to delete {} indices",
                report.failed.len()
            )),
            _ => HealthStatus::Healthy,
        }
    }
}

/// `[0, max_jitter)` 범위에서 초 단위로 균등하게 고릅니다.
fn pick_jitter(max_jitter: Duration) -> Duration {
    let max_secs = max_jitter.as_secs();
    if max_secs == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::rng().random_range(0..max_secs))
}

async fn run<B: IndexBackend>(
    backend: Arc<B>,
    config: SweepConfig,
    jitter: Duration,
    last_report: Arc<Mutex<Option<SweepReport>>>,
    cancel: CancellationToken,
) {
    let mut delay = jitter;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        let report = tokio::select! {
            _ = cancel.cancelled() => break,
            report = sweep(backend.as_ref(), config.retain_days) => report,
        };
        debug!(deleted = report.deleted.len(), "periodic retention sweep done");
        if let Ok(mut guard) = last_report.lock() {
            *guard = Some(report);
        }

        delay = config.interval;
    }
}
