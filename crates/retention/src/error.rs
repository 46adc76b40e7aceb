//! 보존 정책 에러 타입
//!
//! 스윕 자체의 실패(목록 조회, 개별 삭제)는 에러가 아니라 [`SweepReport`](crate::SweepReport)에
//! 기록됩니다. 여기에는 시작을 막아야 하는 설정 에러만 있습니다.

use syslogidx_core::error::{ConfigError, SyslogIdxError};

/// 보존 정책 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },
}

impl From<RetentionError> for SyslogIdxError {
    fn from(err: RetentionError) -> Self {
        match err {
            RetentionError::Config { field, reason } => {
                SyslogIdxError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
