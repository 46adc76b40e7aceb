//! CloudTrail 인덱서 플러그인
//!
//! `init`에서 큐 URL을 조회하고(실패하면 데몬 시작 중단), `start`에서 수신 루프를
//! 스폰합니다. 루프는 에러로 종료되지 않으며 취소 토큰으로만 멈춥니다.
//!
//! ```text
//! loop {
//!     receive ─ error ──> error_backoff 대기
//!             ─ 0건   ──> idle_backoff 대기
//!             ─ N건   ──> 메시지마다 BatchProcessor::process_message
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::counter;
use syslogidx_core::backend::IndexBackend;
use syslogidx_core::error::SyslogIdxError;
use syslogidx_core::metrics as m;
use syslogidx_core::pipeline::HealthStatus;
use syslogidx_core::plugin::{Plugin, PluginInfo, PluginState, PluginType};
use syslogidx_core::queue::QueueClient;
use syslogidx_core::storage::ObjectStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::IndexerConfig;
use crate::processor::BatchProcessor;

/// 플러그인 이름
pub const PLUGIN_NAME: &str = "cloudtrail-indexer";

/// SQS 알림 기반 CloudTrail 인덱서
pub struct CloudTrailIndexer<Q, S, B> {
    info: PluginInfo,
    state: PluginState,
    processor: Arc<BatchProcessor<Q, S, B>>,
    queue_url: Option<String>,
    receive_failed: Arc<AtomicBool>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<Q, S, B> CloudTrailIndexer<Q, S, B>
where
    Q: QueueClient,
    S: ObjectStore,
    B: IndexBackend,
{
    pub fn new(config: IndexerConfig, queue: Arc<Q>, store: Arc<S>, backend: Arc<B>) -> Self {
        Self {
            info: PluginInfo::new(
                PLUGIN_NAME,
                "CloudTrail log bundles from SQS notifications to dated indices",
                PluginType::Indexer,
            ),
            state: PluginState::Created,
            processor: Arc::new(BatchProcessor::new(config, queue, store, backend)),
            queue_url: None,
            receive_failed: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// `init` 이후 조회된 큐 URL
    pub fn queue_url(&self) -> Option<&str> {
        self.queue_url.as_deref()
    }
}

impl<Q, S, B> Plugin for CloudTrailIndexer<Q, S, B>
where
    Q: QueueClient,
    S: ObjectStore,
    B: IndexBackend,
{
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn state(&self) -> PluginState {
        self.state
    }

    async fn init(&mut self) -> Result<(), SyslogIdxError> {
        self.state.ensure(&self.info.name, &[PluginState::Created])?;

        if let Err(e) = self.processor.config().validate() {
            self.state = PluginState::Failed;
            return Err(e.into());
        }

        match self.processor.resolve_queue_url().await {
            Ok(url) => {
                info!(queue = %self.processor.config().queue_name, url = %url, "resolved cloudtrail queue");
                self.queue_url = Some(url);
                self.state = PluginState::Initialized;
                Ok(())
            }
            Err(e) => {
                self.state = PluginState::Failed;
                Err(e.into())
            }
        }
    }

    async fn start(&mut self) -> Result<(), SyslogIdxError> {
        self.state
            .ensure(&self.info.name, &[PluginState::Initialized])?;

        let queue_url = self.queue_url.clone().unwrap_or_default();
        self.task = Some(tokio::spawn(run(
            Arc::clone(&self.processor),
            queue_url,
            Arc::clone(&self.receive_failed),
            self.cancel.clone(),
        )));

        self.state = PluginState::Running;
        info!(
            max_messages = self.processor.config().max_messages,
            wait_time_secs = self.processor.config().wait_time_secs,
            "cloudtrail indexer started"
        );
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SyslogIdxError> {
        self.state.ensure(&self.info.name, &[PluginState::Running])?;

        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        self.state = PluginState::Stopped;
        info!("cloudtrail indexer stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PluginState::Running => match &self.task {
                Some(task) if task.is_finished() => {
                    HealthStatus::Unhealthy("receive loop exited".to_owned())
                }
                _ if self.receive_failed.load(Ordering::Relaxed) => {
                    HealthStatus::Degraded("last queue receive failed".to_owned())
                }
                _ => HealthStatus::Healthy,
            },
            other => HealthStatus::Unhealthy(other.to_string()),
        }
    }
}

/// 취소될 때까지 수신과 처리를 반복합니다.
async fn run<Q, S, B>(
    processor: Arc<BatchProcessor<Q, S, B>>,
    queue_url: String,
    receive_failed: Arc<AtomicBool>,
    cancel: CancellationToken,
) where
    Q: QueueClient,
    S: ObjectStore,
    B: IndexBackend,
{
    let error_backoff = processor.config().error_backoff;
    let idle_backoff = processor.config().idle_backoff;

    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => break,
            result = processor.poll_once(&queue_url) => result,
        };

        let backoff = match polled {
            Ok(0) => {
                receive_failed.store(false, Ordering::Relaxed);
                Some(idle_backoff)
            }
            Ok(_) => {
                receive_failed.store(false, Ordering::Relaxed);
                None
            }
            Err(e) => {
                receive_failed.store(true, Ordering::Relaxed);
                counter!(m::CLOUDTRAIL_RECEIVE_ERRORS_TOTAL).increment(1);
                warn!(error = %e, backoff_secs = error_backoff.as_secs(), "queue receive failed");
                Some(error_backoff)
            }
        };

        if let Some(delay) = backoff {
            if !sleep_or_cancel(delay, &cancel).await {
                break;
            }
        }
    }
}

/// `delay`만큼 대기합니다. 취소되면 `false`를 반환합니다.
async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
