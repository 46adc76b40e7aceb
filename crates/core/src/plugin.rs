//! 플러그인 시스템: 장기 실행 컴포넌트의 등록과 생명주기 관리
//!
//! syslog 리스너, CloudTrail 인덱서, 보존 정책 스윕은 모두 [`Plugin`]을 구현하며
//! 데몬은 [`PluginRegistry`]를 통해 이들을 일괄 초기화/시작/정지합니다.
//!
//! # 생명주기
//! ```text
//! Created → init() → Initialized → start() → Running → stop() → Stopped
//! ```

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, SyslogIdxError};
use crate::pipeline::{BoxFuture, HealthStatus};

// ─── PluginType ──────────────────────────────────────────────────────

/// 플러그인 유형
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginType {
    /// 인바운드 연결을 받는 수집기
    Listener,
    /// 큐 기반 배치 인덱서
    Indexer,
    /// 주기적 유지보수 작업
    Maintenance,
    /// 사용자 정의 플러그인
    Custom(String),
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listener => write!(f, "listener"),
            Self::Indexer => write!(f, "indexer"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

// ─── PluginInfo ──────────────────────────────────────────────────────

/// 플러그인 메타데이터
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// 고유 이름 (예: `"syslog-listener"`)
    pub name: String,
    /// 버전
    pub version: String,
    /// 설명
    pub description: String,
    /// 유형
    pub plugin_type: PluginType,
}

impl PluginInfo {
    /// 크레이트 버전을 사용하는 메타데이터를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        plugin_type: PluginType,
    ) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            description: description.into(),
            plugin_type,
        }
    }
}

// ─── PluginState ─────────────────────────────────────────────────────

/// 플러그인 생명주기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginState {
    Created,
    Initialized,
    Running,
    Stopped,
    Failed,
}

impl PluginState {
    /// 현재 상태가 `allowed` 중 하나인지 확인합니다.
    ///
    /// 아니면 [`PluginError::InvalidState`]를 반환합니다.
    pub fn ensure(self, name: &str, allowed: &[PluginState]) -> Result<(), PluginError> {
        if allowed.contains(&self) {
            return Ok(());
        }
        let expected = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        Err(PluginError::InvalidState {
            name: name.to_owned(),
            current: self.to_string(),
            expected,
        })
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Initialized => write!(f, "initialized"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ─── Plugin Trait ────────────────────────────────────────────────────

/// 모든 장기 실행 컴포넌트가 구현하는 trait
///
/// `init`은 외부 의존성 확인(큐 URL 조회 등)을 수행하며, 실패하면 데몬 시작이
/// 중단됩니다. `start`는 백그라운드 태스크를 스폰하고 즉시 반환해야 합니다.
pub trait Plugin: Send + Sync {
    /// 플러그인 메타데이터를 반환합니다.
    fn info(&self) -> &PluginInfo;

    /// 현재 상태를 반환합니다.
    fn state(&self) -> PluginState;

    /// 플러그인을 초기화합니다. `Created` 상태에서만 호출 가능합니다.
    fn init(&mut self) -> impl Future<Output = Result<(), SyslogIdxError>> + Send;

    /// 백그라운드 작업을 시작합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), SyslogIdxError>> + Send;

    /// 백그라운드 작업을 취소하고 종료를 기다립니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), SyslogIdxError>> + Send;

    /// 건강 상태를 확인합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}

// ─── DynPlugin Trait ─────────────────────────────────────────────────

/// `Vec<Box<dyn DynPlugin>>`로 보관하기 위한 dyn-compatible 버전
///
/// [`Plugin`]을 구현한 타입은 blanket impl로 자동 구현됩니다.
pub trait DynPlugin: Send + Sync {
    fn info(&self) -> &PluginInfo;
    fn state(&self) -> PluginState;
    fn init(&mut self) -> BoxFuture<'_, Result<(), SyslogIdxError>>;
    fn start(&mut self) -> BoxFuture<'_, Result<(), SyslogIdxError>>;
    fn stop(&mut self) -> BoxFuture<'_, Result<(), SyslogIdxError>>;
    fn health_check(&self) -> BoxFuture<'_, HealthStatus>;
}

impl<T: Plugin> DynPlugin for T {
    fn info(&self) -> &PluginInfo {
        Plugin::info(self)
    }

    fn state(&self) -> PluginState {
        Plugin::state(self)
    }

    fn init(&mut self) -> BoxFuture<'_, Result<(), SyslogIdxError>> {
        Box::pin(Plugin::init(self))
    }

    fn start(&mut self) -> BoxFuture<'_, Result<(), SyslogIdxError>> {
        Box::pin(Plugin::start(self))
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<(), SyslogIdxError>> {
        Box::pin(Plugin::stop(self))
    }

    fn health_check(&self) -> BoxFuture<'_, HealthStatus> {
        Box::pin(Plugin::health_check(self))
    }
}

// ─── PluginRegistry ──────────────────────────────────────────────────

/// 등록 순서를 보존하는 플러그인 레지스트리
pub struct PluginRegistry {
    plugins: Vec<Box<dyn DynPlugin>>,
}

impl PluginRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// 플러그인을 등록합니다. 이름이 중복되면 에러를 반환합니다.
    pub fn register(&mut self, plugin: Box<dyn DynPlugin>) -> Result<(), SyslogIdxError> {
        let name = plugin.info().name.clone();
        if self.plugins.iter().any(|p| p.info().name == name) {
            return Err(PluginError::AlreadyRegistered { name }.into());
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// 이름으로 플러그인을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&dyn DynPlugin> {
        self.plugins
            .iter()
            .find(|p| p.info().name == name)
            .map(|p| p.as_ref())
    }

    /// 등록 순서대로 초기화합니다. 첫 실패에서 중단합니다.
    pub async fn init_all(&mut self) -> Result<(), SyslogIdxError> {
        for plugin in &mut self.plugins {
            tracing::debug!(plugin = %plugin.info().name, "initializing plugin");
            plugin.init().await?;
        }
        Ok(())
    }

    /// 등록 순서대로 시작합니다. 첫 실패에서 중단합니다.
    ///
    /// 이미 시작된 플러그인은 롤백하지 않으므로 호출자가 `stop_all`을 호출해야 합니다.
    pub async fn start_all(&mut self) -> Result<(), SyslogIdxError> {
        for plugin in &mut self.plugins {
            tracing::debug!(plugin = %plugin.info().name, "starting plugin");
            plugin.start().await?;
        }
        Ok(())
    }

    /// 실행 중인 모든 플러그인을 정지합니다.
    ///
    /// 개별 실패가 있어도 나머지를 계속 정지하고, 에러를 모아서 반환합니다.
    pub async fn stop_all(&mut self) -> Result<(), SyslogIdxError> {
        let mut errors = Vec::new();
        for plugin in &mut self.plugins {
            if plugin.state() != PluginState::Running {
                continue;
            }
            if let Err(e) = plugin.stop().await {
                errors.push(format!("{}: {}", plugin.info().name, e));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PluginError::StopFailed(errors.join("; ")).into())
        }
    }

    /// 등록된 플러그인 수
    pub fn count(&self) -> usize {
        self.plugins.len()
    }

    /// 등록된 플러그인 메타데이터 목록
    pub fn list(&self) -> Vec<&PluginInfo> {
        self.plugins.iter().map(|p| p.info()).collect()
    }

    /// 모든 플러그인의 상태를 조회합니다.
    pub async fn health_check_all(&self) -> Vec<(String, PluginState, HealthStatus)> {
        let mut statuses = Vec::with_capacity(self.plugins.len());
        for plugin in &self.plugins {
            statuses.push((
                plugin.info().name.clone(),
                plugin.state(),
                plugin.health_check().await,
            ));
        }
        statuses
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct MockPlugin {
        info: PluginInfo,
        state: PluginState,
        fail_on_init: bool,
        fail_on_stop: bool,
    }

    impl MockPlugin {
        fn new(name: &str) -> Self {
            Self {
                info: PluginInfo::new(name, "mock", PluginType::Custom("test".to_owned())),
                state: PluginState::Created,
                fail_on_init: false,
                fail_on_stop: false,
            }
        }
    }

    impl Plugin for MockPlugin {
        fn info(&self) -> &PluginInfo {
            &self.info
        }

        fn state(&self) -> PluginState {
            self.state
        }

        async fn init(&mut self) -> Result<(), SyslogIdxError> {
            self.state.ensure(&self.info.name, &[PluginState::Created])?;
            if self.fail_on_init {
                self.state = PluginState::Failed;
                return Err(PipelineError::InitFailed("mock".to_owned()).into());
            }
            self.state = PluginState::Initialized;
            Ok(())
        }

        async fn start(&mut self) -> Result<(), SyslogIdxError> {
            self.state.ensure(&self.info.name, &[PluginState::Initialized])?;
            self.state = PluginState::Running;
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), SyslogIdxError> {
            self.state.ensure(&self.info.name, &[PluginState::Running])?;
            if self.fail_on_stop {
                return Err(PipelineError::NotRunning.into());
            }
            self.state = PluginState::Stopped;
            Ok(())
        }

        async fn health_check(&self) -> HealthStatus {
            match self.state {
                PluginState::Running => HealthStatus::Healthy,
                other => HealthStatus::Unhealthy(other.to_string()),
            }
        }
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(MockPlugin::new("a"))).unwrap();
        let err = registry.register(Box::new(MockPlugin::new("a"))).unwrap_err();
        assert!(matches!(
            err,
            SyslogIdxError::Plugin(PluginError::AlreadyRegistered { .. })
        ));
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(MockPlugin::new("a"))).unwrap();
        registry.register(Box::new(MockPlugin::new("b"))).unwrap();

        registry.init_all().await.unwrap();
        registry.start_all().await.unwrap();
        let health = registry.health_check_all().await;
        assert!(health.iter().all(|(_, _, h)| h.is_healthy()));

        registry.stop_all().await.unwrap();
        assert_eq!(registry.get("a").unwrap().state(), PluginState::Stopped);
        assert_eq!(registry.get("b").unwrap().state(), PluginState::Stopped);
    }

    #[tokio::test]
    async fn init_all_stops_at_first_failure() {
        let mut registry = PluginRegistry::new();
        let mut failing = MockPlugin::new("a");
        failing.fail_on_init = true;
        registry.register(Box::new(failing)).unwrap();
        registry.register(Box::new(MockPlugin::new("b"))).unwrap();

        assert!(registry.init_all().await.is_err());
        assert_eq!(registry.get("b").unwrap().state(), PluginState::Created);
    }

    #[tokio::test]
    async fn stop_all_continues_after_failure() {
        let mut registry = PluginRegistry::new();
        let mut failing = MockPlugin::new("a");
        failing.fail_on_stop = true;
        registry.register(Box::new(failing)).unwrap();
        registry.register(Box::new(MockPlugin::new("b"))).unwrap();
        registry.init_all().await.unwrap();
        registry.start_all().await.unwrap();

        let err = registry.stop_all().await.unwrap_err();
        assert!(err.to_string().contains("a:"));
        assert_eq!(registry.get("b").unwrap().state(), PluginState::Stopped);
    }

    #[tokio::test]
    async fn stop_all_skips_plugins_that_never_started() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(MockPlugin::new("a"))).unwrap();
        registry.stop_all().await.unwrap();
    }

    #[test]
    fn ensure_reports_expected_states() {
        let err = PluginState::Running
            .ensure("x", &[PluginState::Created, PluginState::Stopped])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "plugin 'x' is running, expected created or stopped"
        );
    }
}
