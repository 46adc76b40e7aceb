//! Syslog 수신기 설정
//!
//! [`ListenerConfig`]는 core의 [`SyslogConfig`]를 수신기 내부 표현으로 바꾼 것입니다.
//!
//! # 사용 예시
//! ```
//! use syslogidx_core::config::SyslogIdxConfig;
//! use syslogidx_syslog::config::ListenerConfig;
//!
//! let core_config = SyslogIdxConfig::default();
//! let config = ListenerConfig::from_core(&core_config.syslog);
//! assert_eq!(config.bind, "127.0.0.1:1514");
//! ```

use std::collections::BTreeMap;

use syslogidx_core::config::SyslogConfig;
use tracing::warn;

use crate::error::SyslogError;

const MAX_CONNECTIONS: usize = 65_536;
const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// TCP syslog 프레이밍 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// 개행 문자로 메시지 구분 (기본값)
    #[default]
    NewlineDelimited,
    /// RFC 6587 octet-counting: `LEN SP MSG`
    OctetCounting,
}

impl Framing {
    /// 설정 문자열 (`newline`, `octet-counting`)에서 변환합니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "newline" => Some(Self::NewlineDelimited),
            "octet-counting" => Some(Self::OctetCounting),
            _ => None,
        }
    }
}

/// Syslog 수신기 설정
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// TCP 바인드 주소
    pub bind: String,
    /// 프레이밍 방식
    pub framing: Framing,
    /// 최대 동시 연결 수
    pub max_connections: usize,
    /// 최대 프레임 크기 (바이트)
    pub max_message_size: usize,
    /// 유휴 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 분류 캐시 시드
    pub json_apps: BTreeMap<String, bool>,
    /// 앱별 고정 문서 타입
    pub app_types: BTreeMap<String, String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::from_core(&SyslogConfig::default())
    }
}

impl ListenerConfig {
    /// core 설정에서 수신기 설정을 생성합니다.
    ///
    /// 알 수 없는 프레이밍 이름은 경고 후 newline으로 대체합니다.
    pub fn from_core(core: &SyslogConfig) -> Self {
        let framing = Framing::from_name(&core.framing).unwrap_or_else(|| {
            warn!(
                framing = core.framing.as_str(),
                "unknown syslog framing, using newline"
            );
            Framing::default()
        });

        Self {
            bind: core.bind.clone(),
            framing,
            max_connections: core.max_connections,
            max_message_size: core.max_message_size,
            connection_timeout_secs: core.connection_timeout_secs,
            json_apps: core.json_apps.clone(),
            app_types: core.app_types.clone(),
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SyslogError> {
        if self.bind.trim().is_empty() {
            return Err(SyslogError::Config {
                field: "bind".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.max_connections == 0 || self.max_connections > MAX_CONNECTIONS {
            return Err(SyslogError::Config {
                field: "max_connections".to_owned(),
                reason: format!("must be 1-{MAX_CONNECTIONS}"),
            });
        }

        if self.max_message_size == 0 || self.max_message_size > MAX_MESSAGE_SIZE {
            return Err(SyslogError::Config {
                field: "max_message_size".to_owned(),
                reason: format!("must be 1-{MAX_MESSAGE_SIZE}"),
            });
        }

        if self.connection_timeout_secs == 0 {
            return Err(SyslogError::Config {
                field: "connection_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if let Some((app, _)) = self.app_types.iter().find(|(_, t)| t.is_empty()) {
            return Err(SyslogError::Config {
                field: format!("app_types.{app}"),
                reason: "document type must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// 수신기 설정 빌더
#[derive(Default)]
pub struct ListenerConfigBuilder {
    config: ListenerConfig,
}

impl ListenerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 바인드 주소를 설정합니다.
    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.config.bind = bind.into();
        self
    }

    /// 프레이밍 방식을 설정합니다.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;
        self
    }

    /// 최대 동시 연결 수를 설정합니다.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    /// 최대 프레임 크기를 설정합니다.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// 유휴 연결 타임아웃(초)을 설정합니다.
    pub fn connection_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connection_timeout_secs = secs;
        self
    }

    /// 분류 캐시 시드를 설정합니다.
    pub fn json_apps(mut self, apps: BTreeMap<String, bool>) -> Self {
        self.config.json_apps = apps;
        self
    }

    /// 앱 하나의 고정 문서 타입을 추가합니다.
    pub fn app_type(mut self, app: impl Into<String>, doc_type: impl Into<String>) -> Self {
        self.config.app_types.insert(app.into(), doc_type.into());
        self
    }

    /// 설정을 검증하고 `ListenerConfig`를 생성합니다.
    pub fn build(self) -> Result<ListenerConfig, SyslogError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
