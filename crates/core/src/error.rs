//! 에러 타입: 도메인별 에러 정의
//!
//! 각 크레이트는 자체 도메인 에러를 정의하고 `From<DomainError> for SyslogIdxError`
//! 변환을 구현하여 `?` 연산자로 상위 레이어에 전파합니다.

/// syslogidx 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SyslogIdxError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 컴포넌트 실행 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 플러그인 생명주기 에러
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 인덱스 백엔드 에러
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// 큐/오브젝트 스토리지 전송 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 컴포넌트 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 초기화 실패
    #[error("initialization failed: {0}")]
    InitFailed(String),

    /// 이미 실행 중
    #[error("already running")]
    AlreadyRunning,

    /// 실행 중이 아님
    #[error("not running")]
    NotRunning,
}

/// 플러그인 등록/생명주기 에러
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// 같은 이름의 플러그인이 이미 등록됨
    #[error("plugin already registered: {name}")]
    AlreadyRegistered { name: String },

    /// 플러그인을 찾을 수 없음
    #[error("plugin not found: {name}")]
    NotFound { name: String },

    /// 허용되지 않는 상태 전환
    #[error("plugin '{name}' is {current}, expected {expected}")]
    InvalidState {
        name: String,
        current: String,
        expected: String,
    },

    /// 하나 이상의 플러그인 정지 실패
    #[error("failed to stop plugins: {0}")]
    StopFailed(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 파싱 실패
    #[error("parse failed at offset {offset}: {reason}")]
    Failed { offset: usize, reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// 인덱스 백엔드 에러
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 요청 전송 실패 (연결, 타임아웃 등)
    #[error("request failed: {0}")]
    Request(String),

    /// 2xx가 아닌 응답
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// 큐/오브젝트 스토리지 전송 에러
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 자격 증명 누락 또는 잘못됨
    #[error("credentials error: {0}")]
    Credentials(String),

    /// 요청 전송 실패
    #[error("request failed: {0}")]
    Request(String),

    /// 2xx가 아닌 응답
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: SyslogIdxError = ConfigError::InvalidValue {
            field: "retention.retain_days".to_owned(),
            reason: "must be positive".to_owned(),
        }
        .into();
        assert!(matches!(err, SyslogIdxError::Config(_)));
        assert!(err.to_string().contains("retention.retain_days"));
    }

    #[test]
    fn backend_status_display() {
        let err = BackendError::Status {
            status: 503,
            body: "unavailable".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("unavailable"));
    }

    #[test]
    fn plugin_invalid_state_display() {
        let err = PluginError::InvalidState {
            name: "syslog-listener".to_owned(),
            current: "running".to_owned(),
            expected: "initialized".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "plugin 'syslog-listener' is running, expected initialized"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy");
        let err: SyslogIdxError = io.into();
        assert!(matches!(err, SyslogIdxError::Io(_)));
    }
}
