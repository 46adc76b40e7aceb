//! Syslog 수신기 에러 타입
//!
//! [`SyslogError`]는 파싱, 바인드, 연결 처리, 설정 검증에서 발생하는 에러를 표현합니다.
//! `From<SyslogError> for SyslogIdxError` 변환으로 상위 레이어에 전파됩니다.

use syslogidx_core::error::{ConfigError, ParseError, PipelineError, SyslogIdxError};

/// Syslog 수신기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SyslogError {
    /// RFC 5424 파싱 실패
    #[error("syslog parse error at offset {offset}: {reason}")]
    Parse {
        /// 실패 위치 (바이트 오프셋)
        offset: usize,
        /// 실패 사유
        reason: String,
    },

    /// 프레임이 최대 크기를 초과함
    #[error("frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 잘못된 octet-counting 길이 접두사
    #[error("invalid frame length prefix: {0}")]
    InvalidFrameLength(String),

    /// 리스너 바인드 실패
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyslogError {
    pub(crate) fn parse(offset: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<SyslogError> for SyslogIdxError {
    fn from(err: SyslogError) -> Self {
        match err {
            SyslogError::Parse { offset, reason } => {
                SyslogIdxError::Parse(ParseError::Failed { offset, reason })
            }
            SyslogError::FrameTooLarge { size, max } => {
                SyslogIdxError::Parse(ParseError::TooLarge { size, max })
            }
            SyslogError::Config { field, reason } => {
                SyslogIdxError::Config(ConfigError::InvalidValue { field, reason })
            }
            SyslogError::Io(e) => SyslogIdxError::Io(e),
            other => SyslogIdxError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
