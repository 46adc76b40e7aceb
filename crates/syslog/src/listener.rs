//! Syslog 수신기 플러그인
//!
//! [`SyslogListener`]는 TCP 리스너, 분류 캐시, 정규화 핸들러를 묶어
//! core의 [`Plugin`] 생명주기에 연결합니다.
//!
//! # 사용 예시
//! ```ignore
//! let mut listener = SyslogListener::new(ListenerConfig::from_core(&config.syslog), backend);
//! listener.init().await?;
//! listener.start().await?;
//! println!("listening on {:?}", listener.local_addr());
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use syslogidx_core::backend::IndexBackend;
use syslogidx_core::error::SyslogIdxError;
use syslogidx_core::pipeline::HealthStatus;
use syslogidx_core::plugin::{Plugin, PluginInfo, PluginState, PluginType};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::classify::ClassificationCache;
use crate::config::ListenerConfig;
use crate::error::SyslogError;
use crate::normalizer::SyslogHandler;
use crate::tcp;

/// 플러그인 이름
pub const PLUGIN_NAME: &str = "syslog-listener";

/// RFC 5424 TCP 수신기
pub struct SyslogListener<B: IndexBackend> {
    info: PluginInfo,
    state: PluginState,
    config: Arc<ListenerConfig>,
    handler: Arc<SyslogHandler<B>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl<B: IndexBackend> SyslogListener<B> {
    /// 새 수신기를 생성합니다. 분류 캐시는 설정의 시드로 채워집니다.
    pub fn new(config: ListenerConfig, backend: Arc<B>) -> Self {
        let cache = Arc::new(ClassificationCache::with_seed(
            config
                .json_apps
                .iter()
                .map(|(app, is_json)| (app.clone(), *is_json)),
        ));
        let handler = Arc::new(SyslogHandler::new(
            backend,
            cache,
            config.app_types.clone(),
        ));

        Self {
            info: PluginInfo::new(
                PLUGIN_NAME,
                "RFC 5424 syslog over TCP to dated indices",
                PluginType::Listener,
            ),
            state: PluginState::Created,
            config: Arc::new(config),
            handler,
            cancel: CancellationToken::new(),
            task: None,
            local_addr: None,
        }
    }

    /// 실제로 바인드된 주소. 시작 전에는 `None`입니다.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// 분류 캐시
    pub fn cache(&self) -> &Arc<ClassificationCache> {
        self.handler.cache()
    }
}

impl<B: IndexBackend> Plugin for SyslogListener<B> {
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

        let listener = match TcpListener::bind(&self.config.bind).await {
            Ok(l) => l,
            Err(e) => {
                self.state = PluginState::Failed;
                return Err(SyslogError::Bind {
                    addr: self.config.bind.clone(),
                    reason: e.to_string(),
                }
                .into());
            }
        };
        let local_addr = listener.local_addr().map_err(SyslogError::from)?;
        self.local_addr = Some(local_addr);

        info!(
            addr = %local_addr,
            framing = ?self.config.framing,
            max_connections = self.config.max_connections,
            "syslog listener started"
        );

        self.task = Some(tokio::spawn(tcp::serve(
            listener,
            Arc::clone(&self.config),
            Arc::clone(&self.handler),
            self.cancel.clone(),
        )));
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
        info!("syslog listener stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PluginState::Running => match &self.task {
                Some(task) if !task.is_finished() => HealthStatus::Healthy,
                _ => HealthStatus::Unhealthy("accept loop exited".to_owned()),
            },
            other => HealthStatus::Unhealthy(other.to_string()),
        }
    }
}
