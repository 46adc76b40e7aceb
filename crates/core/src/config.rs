//! 설정 관리: syslogidx.toml 파싱 및 런타임 설정
//!
//! [`SyslogIdxConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SYSLOGIDX_CLOUDTRAIL_QUEUE_NAME=audit` 형식)
//! 3. 설정 파일 (`syslogidx.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), syslogidx_core::error::SyslogIdxError> {
//! use syslogidx_core::config::SyslogIdxConfig;
//!
//! let config = SyslogIdxConfig::load("syslogidx.toml").await?;
//! let config = SyslogIdxConfig::parse("[retention]\nretain_days = 30")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SyslogIdxError};

/// SQS가 한 번에 돌려줄 수 있는 최대 메시지 수
const MAX_RECEIVE_MESSAGES: u32 = 10;
/// SQS long-poll 최대 대기 시간 (초)
const MAX_WAIT_TIME_SECS: u32 = 20;
/// SQS visibility timeout 최대값 (12시간)
const MAX_VISIBILITY_TIMEOUT_SECS: u32 = 43_200;

/// syslogidx 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyslogIdxConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub syslog: SyslogConfig,
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub cloudtrail: CloudTrailConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl SyslogIdxConfig {
    /// TOML 파일을 로드하고 환경변수 오버라이드를 적용한 뒤 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SyslogIdxError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 읽습니다 (환경변수 오버라이드, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SyslogIdxError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SyslogIdxError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SyslogIdxError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SyslogIdxError> {
        toml::from_str(toml_str).map_err(|e| {
            SyslogIdxError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 네이밍 규칙: `SYSLOGIDX_{SECTION}_{FIELD}`.
    /// AWS 리전은 표준 `AWS_REGION`도 인식하며 `SYSLOGIDX_AWS_REGION`이 우선합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SYSLOGIDX_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SYSLOGIDX_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.pid_file, "SYSLOGIDX_GENERAL_PID_FILE");

        // Syslog
        override_bool(&mut self.syslog.enabled, "SYSLOGIDX_SYSLOG_ENABLED");
        override_string(&mut self.syslog.bind, "SYSLOGIDX_SYSLOG_BIND");
        override_string(&mut self.syslog.framing, "SYSLOGIDX_SYSLOG_FRAMING");
        override_usize(
            &mut self.syslog.max_connections,
            "SYSLOGIDX_SYSLOG_MAX_CONNECTIONS",
        );
        override_usize(
            &mut self.syslog.max_message_size,
            "SYSLOGIDX_SYSLOG_MAX_MESSAGE_SIZE",
        );
        override_u64(
            &mut self.syslog.connection_timeout_secs,
            "SYSLOGIDX_SYSLOG_CONNECTION_TIMEOUT_SECS",
        );

        // Elasticsearch
        override_string(&mut self.elasticsearch.url, "SYSLOGIDX_ELASTICSEARCH_URL");
        override_u64(
            &mut self.elasticsearch.request_timeout_secs,
            "SYSLOGIDX_ELASTICSEARCH_REQUEST_TIMEOUT_SECS",
        );

        // AWS
        override_string(&mut self.aws.region, "AWS_REGION");
        override_string(&mut self.aws.region, "SYSLOGIDX_AWS_REGION");
        override_string(&mut self.aws.sqs_endpoint, "SYSLOGIDX_AWS_SQS_ENDPOINT");
        override_string(&mut self.aws.s3_endpoint, "SYSLOGIDX_AWS_S3_ENDPOINT");

        // CloudTrail
        override_bool(&mut self.cloudtrail.enabled, "SYSLOGIDX_CLOUDTRAIL_ENABLED");
        override_string(
            &mut self.cloudtrail.queue_name,
            "SYSLOGIDX_CLOUDTRAIL_QUEUE_NAME",
        );
        override_string(&mut self.cloudtrail.doc_type, "SYSLOGIDX_CLOUDTRAIL_DOC_TYPE");
        override_string(&mut self.cloudtrail.app_tag, "SYSLOGIDX_CLOUDTRAIL_APP_TAG");
        override_u32(
            &mut self.cloudtrail.max_messages,
            "SYSLOGIDX_CLOUDTRAIL_MAX_MESSAGES",
        );
        override_u32(
            &mut self.cloudtrail.visibility_timeout_secs,
            "SYSLOGIDX_CLOUDTRAIL_VISIBILITY_TIMEOUT_SECS",
        );
        override_u32(
            &mut self.cloudtrail.wait_time_secs,
            "SYSLOGIDX_CLOUDTRAIL_WAIT_TIME_SECS",
        );
        override_u64(
            &mut self.cloudtrail.error_backoff_secs,
            "SYSLOGIDX_CLOUDTRAIL_ERROR_BACKOFF_SECS",
        );
        override_u64(
            &mut self.cloudtrail.idle_backoff_secs,
            "SYSLOGIDX_CLOUDTRAIL_IDLE_BACKOFF_SECS",
        );
        override_bool(
            &mut self.cloudtrail.idempotent_ids,
            "SYSLOGIDX_CLOUDTRAIL_IDEMPOTENT_IDS",
        );

        // Retention
        override_bool(&mut self.retention.enabled, "SYSLOGIDX_RETENTION_ENABLED");
        override_u32(
            &mut self.retention.retain_days,
            "SYSLOGIDX_RETENTION_RETAIN_DAYS",
        );
        override_u64(
            &mut self.retention.interval_secs,
            "SYSLOGIDX_RETENTION_INTERVAL_SECS",
        );
        override_u64(
            &mut self.retention.max_jitter_secs,
            "SYSLOGIDX_RETENTION_MAX_JITTER_SECS",
        );

        // Archive
        override_bool(&mut self.archive.enabled, "SYSLOGIDX_ARCHIVE_ENABLED");

        // Metrics
        override_bool(&mut self.metrics.enabled, "SYSLOGIDX_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "SYSLOGIDX_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "SYSLOGIDX_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SyslogIdxError> {
        one_of(
            "general.log_level",
            &self.general.log_level,
            &["trace", "debug", "info", "warn", "error"],
        )?;
        one_of(
            "general.log_format",
            &self.general.log_format,
            &["json", "pretty"],
        )?;

        if self.syslog.enabled {
            non_empty("syslog.bind", &self.syslog.bind)?;
            one_of(
                "syslog.framing",
                &self.syslog.framing,
                &["newline", "octet-counting"],
            )?;
            positive("syslog.max_connections", self.syslog.max_connections as u64)?;
            positive(
                "syslog.max_message_size",
                self.syslog.max_message_size as u64,
            )?;
            positive(
                "syslog.connection_timeout_secs",
                self.syslog.connection_timeout_secs,
            )?;
        }

        let url = &self.elasticsearch.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(
                "elasticsearch.url",
                "must start with http:// or https://",
            ));
        }

        if self.cloudtrail.enabled {
            non_empty("cloudtrail.queue_name", &self.cloudtrail.queue_name)?;
            non_empty("cloudtrail.doc_type", &self.cloudtrail.doc_type)?;
            if self.cloudtrail.max_messages == 0
                || self.cloudtrail.max_messages > MAX_RECEIVE_MESSAGES
            {
                return Err(invalid(
                    "cloudtrail.max_messages",
                    &format!("must be 1-{MAX_RECEIVE_MESSAGES}"),
                ));
            }
            if self.cloudtrail.wait_time_secs > MAX_WAIT_TIME_SECS {
                return Err(invalid(
                    "cloudtrail.wait_time_secs",
                    &format!("must be at most {MAX_WAIT_TIME_SECS}"),
                ));
            }
            if self.cloudtrail.visibility_timeout_secs == 0
                || self.cloudtrail.visibility_timeout_secs > MAX_VISIBILITY_TIMEOUT_SECS
            {
                return Err(invalid(
                    "cloudtrail.visibility_timeout_secs",
                    &format!("must be 1-{MAX_VISIBILITY_TIMEOUT_SECS}"),
                ));
            }
            positive(
                "cloudtrail.idle_backoff_secs",
                self.cloudtrail.idle_backoff_secs,
            )?;
            positive(
                "cloudtrail.error_backoff_secs",
                self.cloudtrail.error_backoff_secs,
            )?;
        }

        if self.cloudtrail.enabled || self.archive.enabled {
            non_empty("aws.region", &self.aws.region)?;
        }

        if self.retention.enabled && self.retention.retain_days > 0 {
            positive("retention.interval_secs", self.retention.interval_secs)?;
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid("metrics.port", "must not be 0"));
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// PID 파일 경로 (빈 문자열이면 사용 안 함)
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: String::new(),
        }
    }
}

/// Syslog 리스너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// TCP 바인드 주소
    pub bind: String,
    /// 프레이밍 방식 (newline, octet-counting)
    pub framing: String,
    /// 최대 동시 연결 수
    pub max_connections: usize,
    /// 최대 프레임 크기 (바이트)
    pub max_message_size: usize,
    /// 유휴 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 시작 시 분류 캐시에 넣을 앱 (앱 이름 → JSON 출력 여부)
    pub json_apps: BTreeMap<String, bool>,
    /// 앱별 고정 문서 타입
    pub app_types: BTreeMap<String, String>,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        let json_apps = [
            ("dhclient", false),
            ("kernel", false),
            ("rsyslogd", false),
            ("sshd", false),
            ("sudo", false),
            ("mysql-audit", true),
            ("deploy", true),
            ("restapi", true),
        ]
        .into_iter()
        .map(|(app, is_json)| (app.to_owned(), is_json))
        .collect();

        Self {
            enabled: true,
            bind: "127.0.0.1:1514".to_owned(),
            framing: "newline".to_owned(),
            max_connections: 256,
            max_message_size: 1024 * 1024, // 1MB
            connection_timeout_secs: 300,
            json_apps,
            app_types: BTreeMap::new(),
        }
    }
}

/// Elasticsearch 백엔드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// 기본 URL
    pub url: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

/// AWS 클라이언트 설정
///
/// 자격 증명은 설정 파일에 두지 않고 표준 환경변수에서 읽습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// 리전
    pub region: String,
    /// SQS 엔드포인트 (빈 문자열이면 리전에서 유도)
    pub sqs_endpoint: String,
    /// S3 엔드포인트 (빈 문자열이면 리전에서 유도)
    pub s3_endpoint: String,
    /// 요청 타임아웃 (초). long-poll 대기 시간보다 커야 합니다.
    pub request_timeout_secs: u64,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_owned(),
            sqs_endpoint: String::new(),
            s3_endpoint: String::new(),
            request_timeout_secs: 60,
        }
    }
}

/// CloudTrail 배치 인덱서 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTrailConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 알림 큐 이름
    pub queue_name: String,
    /// 레코드 문서 타입
    pub doc_type: String,
    /// 레코드에 붙일 `@app` 태그 (빈 문자열이면 생략)
    pub app_tag: String,
    /// 폴링당 최대 메시지 수
    pub max_messages: u32,
    /// visibility timeout (초)
    pub visibility_timeout_secs: u32,
    /// long-poll 대기 시간 (초)
    pub wait_time_secs: u32,
    /// 수신 실패 후 대기 (초)
    pub error_backoff_secs: u64,
    /// 빈 큐 수신 후 대기 (초)
    pub idle_backoff_secs: u64,
    /// 오브젝트 키와 레코드 위치로 문서 ID를 유도할지 여부
    pub idempotent_ids: bool,
}

impl Default for CloudTrailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_name: "cloudtrail".to_owned(),
            doc_type: "cloudtrail".to_owned(),
            app_tag: "syslogidx".to_owned(),
            max_messages: 1,
            visibility_timeout_secs: 120,
            wait_time_secs: 20,
            error_backoff_secs: 60,
            idle_backoff_secs: 60,
            idempotent_ids: false,
        }
    }
}

/// 인덱스 보존 정책 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// 주기적 스윕 활성화 여부
    pub enabled: bool,
    /// 보존할 날짜 인덱스 수 (0이면 주기적 스윕 비활성화)
    pub retain_days: u32,
    /// 스윕 주기 (초)
    pub interval_secs: u64,
    /// 첫 스윕 전 최대 무작위 지연 (초)
    pub max_jitter_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retain_days: 60,
            interval_secs: 24 * 60 * 60,
            max_jitter_secs: 2 * 60 * 60,
        }
    }
}

/// 로그 아카이브 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// 활성화 여부
    pub enabled: bool,
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리슨 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 검증 헬퍼 ---

fn invalid(field: &str, reason: &str) -> SyslogIdxError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
    .into()
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), SyslogIdxError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            &format!("must be one of: {}", allowed.join(", ")),
        ))
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), SyslogIdxError> {
    if value.trim().is_empty() {
        Err(invalid(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn positive(field: &str, value: u64) -> Result<(), SyslogIdxError> {
    if value == 0 {
        Err(invalid(field, "must be greater than 0"))
    } else {
        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str, type_name: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse {type_name} from env var, ignoring"
            ),
        }
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    override_parsed(target, env_key, "bool");
}

fn override_usize(target: &mut usize, env_key: &str) {
    override_parsed(target, env_key, "usize");
}

fn override_u16(target: &mut u16, env_key: &str) {
    override_parsed(target, env_key, "u16");
}

fn override_u32(target: &mut u32, env_key: &str) {
    override_parsed(target, env_key, "u32");
}

fn override_u64(target: &mut u64, env_key: &str) {
    override_parsed(target, env_key, "u64");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = SyslogIdxConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.syslog.bind, "127.0.0.1:1514");
        assert_eq!(config.elasticsearch.url, "http://127.0.0.1:9200");
        assert!(!config.cloudtrail.enabled);
        assert_eq!(config.cloudtrail.queue_name, "cloudtrail");
        assert_eq!(config.retention.retain_days, 60);
        assert!(!config.archive.enabled);
    }

    #[test]
    fn default_json_apps_are_seeded() {
        let apps = SyslogConfig::default().json_apps;
        assert_eq!(apps.get("sshd"), Some(&false));
        assert_eq!(apps.get("kernel"), Some(&false));
        assert_eq!(apps.get("restapi"), Some(&true));
        assert_eq!(apps.get("mysql-audit"), Some(&true));
        assert_eq!(apps.len(), 8);
    }

    #[test]
    fn default_config_passes_validation() {
        SyslogIdxConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = SyslogIdxConfig::parse("").unwrap();
        assert_eq!(config.cloudtrail.visibility_timeout_secs, 120);
        assert_eq!(config.cloudtrail.wait_time_secs, 20);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[cloudtrail]
enabled = true
queue_name = "audit-trail"

[syslog.app_types]
nginx = "access"

[syslog.json_apps]
worker = true
"#;
        let config = SyslogIdxConfig::parse(toml).unwrap();
        assert!(config.cloudtrail.enabled);
        assert_eq!(config.cloudtrail.queue_name, "audit-trail");
        assert_eq!(config.cloudtrail.doc_type, "cloudtrail");
        assert_eq!(config.syslog.app_types.get("nginx").unwrap(), "access");
        // 테이블을 지정하면 기본 시드를 대체합니다
        assert_eq!(config.syslog.json_apps.len(), 1);
        assert_eq!(config.syslog.json_apps.get("worker"), Some(&true));
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = SyslogIdxConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            SyslogIdxError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = SyslogIdxConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_unknown_framing() {
        let mut config = SyslogIdxConfig::default();
        config.syslog.framing = "stx".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("syslog.framing"));
    }

    #[test]
    fn validate_skips_syslog_when_disabled() {
        let mut config = SyslogIdxConfig::default();
        config.syslog.enabled = false;
        config.syslog.framing = "stx".to_owned();
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_non_http_elasticsearch_url() {
        let mut config = SyslogIdxConfig::default();
        config.elasticsearch.url = "127.0.0.1:9200".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("elasticsearch.url"));
    }

    #[test]
    fn validate_rejects_receive_batch_above_queue_limit() {
        let mut config = SyslogIdxConfig::default();
        config.cloudtrail.enabled = true;
        config.cloudtrail.max_messages = 11;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_messages"));
    }

    #[test]
    fn validate_rejects_long_poll_above_limit() {
        let mut config = SyslogIdxConfig::default();
        config.cloudtrail.enabled = true;
        config.cloudtrail.wait_time_secs = 21;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_region_for_archive() {
        let mut config = SyslogIdxConfig::default();
        config.archive.enabled = true;
        config.aws.region = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("aws.region"));
    }

    #[test]
    fn validate_rejects_zero_interval_only_when_sweeping() {
        let mut config = SyslogIdxConfig::default();
        config.retention.interval_secs = 0;
        assert!(config.validate().is_err());

        config.retention.retain_days = 0;
        config.validate().unwrap();
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 고유한 키를 사용하므로 다른 테스트와 충돌하지 않습니다.
        unsafe { std::env::set_var("TEST_SYSLOGIDX_STR", "overridden") };
        override_string(&mut val, "TEST_SYSLOGIDX_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_SYSLOGIDX_STR") };
    }

    #[test]
    fn env_override_invalid_number_keeps_original() {
        let mut val = 60u32;
        // SAFETY: 고유한 키를 사용하므로 다른 테스트와 충돌하지 않습니다.
        unsafe { std::env::set_var("TEST_SYSLOGIDX_U32_BAD", "sixty") };
        override_u32(&mut val, "TEST_SYSLOGIDX_U32_BAD");
        assert_eq!(val, 60);
        unsafe { std::env::remove_var("TEST_SYSLOGIDX_U32_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = true;
        override_bool(&mut val, "TEST_SYSLOGIDX_NONEXISTENT_12345");
        assert!(val);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = SyslogIdxConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = SyslogIdxConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.syslog.json_apps, config.syslog.json_apps);
        assert_eq!(parsed.retention.retain_days, config.retention.retain_days);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = SyslogIdxConfig::from_file("/nonexistent/path/syslogidx.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyslogIdxError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
