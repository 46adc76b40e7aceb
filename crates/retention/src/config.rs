//! 보존 정책 설정
//!
//! [`SweepConfig`]는 core의 [`RetentionConfig`]를 스윕 내부 표현으로 바꾼 것입니다.

use std::time::Duration;

use syslogidx_core::config::RetentionConfig;

use crate::error::RetentionError;

/// 보존 정책 스윕 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// 보존할 날짜 인덱스 수. 0이면 주기 스윕을 하지 않습니다.
    pub retain_days: u32,
    /// 스윕 주기
    pub interval: Duration,
    /// 첫 스윕 전 최대 무작위 지연
    pub max_jitter: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::from_core(&RetentionConfig::default())
    }
}

impl SweepConfig {
    /// core 설정에서 스윕 설정을 생성합니다.
    pub fn from_core(core: &RetentionConfig) -> Self {
        Self {
            retain_days: core.retain_days,
            interval: Duration::from_secs(core.interval_secs),
            max_jitter: Duration::from_secs(core.max_jitter_secs),
        }
    }

    /// 주기 스윕 활성화 여부
    pub fn is_periodic(&self) -> bool {
        self.retain_days > 0
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RetentionError> {
        if self.is_periodic() && self.interval.is_zero() {
            return Err(RetentionError::Config {
                field: "interval_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        Ok(())
    }
}
