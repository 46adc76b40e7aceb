//! CloudTrail 인덱서 설정
//!
//! [`IndexerConfig`]는 core의 [`CloudTrailConfig`]를 인덱서 내부 표현으로 바꾼 것입니다.
//!
//! # 사용 예시
//! ```
//! use syslogidx_core::config::SyslogIdxConfig;
//! use syslogidx_cloudtrail::config::IndexerConfig;
//!
//! let core_config = SyslogIdxConfig::default();
//! let config = IndexerConfig::from_core(&core_config.cloudtrail);
//! assert_eq!(config.queue_name, "cloudtrail");
//! ```

use std::time::Duration;

use syslogidx_core::config::CloudTrailConfig;

use crate::error::CloudTrailError;

/// SQS가 한 번에 돌려주는 최대 메시지 수
const MAX_MESSAGES: u32 = 10;
/// SQS long-poll 최대 대기 시간 (초)
const MAX_WAIT_TIME_SECS: u32 = 20;
/// SQS visibility timeout 최대값 (12시간)
const MAX_VISIBILITY_TIMEOUT_SECS: u32 = 12 * 60 * 60;

/// CloudTrail 인덱서 설정
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// 알림 큐 이름
    pub queue_name: String,
    /// 레코드 문서 타입
    pub doc_type: String,
    /// `@app` 태그 (빈 문자열이면 생략)
    pub app_tag: String,
    /// 폴링당 최대 메시지 수
    pub max_messages: u32,
    /// visibility timeout (초)
    pub visibility_timeout_secs: u32,
    /// long-poll 대기 시간 (초)
    pub wait_time_secs: u32,
    /// 수신 실패 후 대기
    pub error_backoff: Duration,
    /// 빈 큐 수신 후 대기
    pub idle_backoff: Duration,
    /// 결정적 문서 ID 사용 여부
    pub idempotent_ids: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self::from_core(&CloudTrailConfig::default())
    }
}

impl IndexerConfig {
    /// core 설정에서 인덱서 설정을 생성합니다.
    pub fn from_core(core: &CloudTrailConfig) -> Self {
        Self {
            queue_name: core.queue_name.clone(),
            doc_type: core.doc_type.clone(),
            app_tag: core.app_tag.clone(),
            max_messages: core.max_messages,
            visibility_timeout_secs: core.visibility_timeout_secs,
            wait_time_secs: core.wait_time_secs,
            error_backoff: Duration::from_secs(core.error_backoff_secs),
            idle_backoff: Duration::from_secs(core.idle_backoff_secs),
            idempotent_ids: core.idempotent_ids,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 백오프가 0이면 빈 큐에서 바쁜 루프가 되므로 거부합니다.
    pub fn validate(&self) -> Result<(), CloudTrailError> {
        if self.queue_name.trim().is_empty() {
            return Err(config_error("queue_name", "must not be empty"));
        }
        if self.doc_type.trim().is_empty() {
            return Err(config_error("doc_type", "must not be empty"));
        }
        if self.max_messages == 0 || self.max_messages > MAX_MESSAGES {
            return Err(config_error(
                "max_messages",
                format!("must be 1-{MAX_MESSAGES}"),
            ));
        }
        if self.visibility_timeout_secs > MAX_VISIBILITY_TIMEOUT_SECS {
            return Err(config_error(
                "visibility_timeout_secs",
                format!("must be at most {MAX_VISIBILITY_TIMEOUT_SECS}"),
            ));
        }
        if self.wait_time_secs > MAX_WAIT_TIME_SECS {
            return Err(config_error(
                "wait_time_secs",
                format!("must be at most {MAX_WAIT_TIME_SECS}"),
            ));
        }
        if self.error_backoff.is_zero() {
            return Err(config_error("error_backoff_secs", "must be greater than 0"));
        }
        if self.idle_backoff.is_zero() {
            return Err(config_error("idle_backoff_secs", "must be greater than 0"));
        }
        Ok(())
    }
}

fn config_error(field: &str, reason: impl Into<String>) -> CloudTrailError {
    CloudTrailError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// 인덱서 설정 빌더
#[derive(Default)]
pub struct IndexerConfigBuilder {
    config: IndexerConfig,
}

impl IndexerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_name(mut self, name: impl Into<String>) -> Self {
        self.config.queue_name = name.into();
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.config.doc_type = doc_type.into();
        self
    }

    /// `@app` 태그를 설정합니다. 빈 문자열이면 태그를 붙이지 않습니다.
    pub fn app_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.app_tag = tag.into();
        self
    }

    pub fn max_messages(mut self, max: u32) -> Self {
        self.config.max_messages = max;
        self
    }

    pub fn visibility_timeout_secs(mut self, secs: u32) -> Self {
        self.config.visibility_timeout_secs = secs;
        self
    }

    pub fn wait_time_secs(mut self, secs: u32) -> Self {
        self.config.wait_time_secs = secs;
        self
    }

    pub fn error_backoff(mut self, backoff: Duration) -> Self {
        self.config.error_backoff = backoff;
        self
    }

    pub fn idle_backoff(mut self, backoff: Duration) -> Self {
        self.config.idle_backoff = backoff;
        self
    }

    pub fn idempotent_ids(mut self, enabled: bool) -> Self {
        self.config.idempotent_ids = enabled;
        self
    }

    /// 설정을 검증하고 `IndexerConfig`를 생성합니다.
    pub fn build(self) -> Result<IndexerConfig, CloudTrailError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
