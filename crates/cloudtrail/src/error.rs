//! CloudTrail 인덱서 에러 타입
//!
//! 오브젝트 단위 실패(`Fetch`, `Decode`, `MissingEventTime`, `Index`)는 인덱서 내부에서
//! 집계되고 로그로만 남습니다. `QueueUrl`과 `Config`만 데몬까지 전파됩니다.

use syslogidx_core::error::{
    BackendError, ConfigError, PipelineError, SyslogIdxError, TransportError,
};

/// CloudTrail 인덱서 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CloudTrailError {
    /// 큐 URL 조회 실패 (시작 시 치명적)
    #[error("failed to resolve queue '{queue}': {source}")]
    QueueUrl {
        queue: String,
        #[source]
        source: TransportError,
    },

    /// 큐 메시지 본문 디코딩 실패
    #[error("invalid notification: {0}")]
    Notification(String),

    /// 오브젝트 조회 실패
    #[error("failed to fetch s3://{bucket}/{key}: {source}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: TransportError,
    },

    /// 로그 번들 디코딩 실패
    #[error("failed to decode log bundle: {0}")]
    Decode(String),

    /// 레코드에 파싱 가능한 `eventTime`이 없음
    #[error("record {offset} has no valid eventTime")]
    MissingEventTime { offset: usize },

    /// 레코드 인덱싱 실패
    #[error("failed to index record {offset}: {source}")]
    Index {
        offset: usize,
        #[source]
        source: BackendError,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },
}

impl From<CloudTrailError> for SyslogIdxError {
    fn from(err: CloudTrailError) -> Self {
        match err {
            CloudTrailError::QueueUrl { source, .. } => SyslogIdxError::Transport(source),
            CloudTrailError::Fetch { source, .. } => SyslogIdxError::Transport(source),
            CloudTrailError::Index { source, .. } => SyslogIdxError::Backend(source),
            CloudTrailError::Config { field, reason } => {
                SyslogIdxError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => SyslogIdxError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
