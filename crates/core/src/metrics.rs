//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수로 `metrics::counter!()`, `metrics::gauge!()`를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `syslogidx_`
//! - 컴포넌트: `syslog_`, `cloudtrail_`, `retention_`, `daemon_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 ──────────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 분류 전환 레이블 키 (json, plain)
pub const LABEL_CLASSIFICATION: &str = "classification";

// ─── Syslog ─────────────────────────────────────────────────────────

/// Syslog: 현재 열린 TCP 연결 수 (gauge)
pub const SYSLOG_CONNECTIONS_ACTIVE: &str = "syslogidx_syslog_connections_active";

/// Syslog: 연결 한도 초과로 거부된 연결 수 (counter)
pub const SYSLOG_CONNECTIONS_REJECTED_TOTAL: &str = "syslogidx_syslog_connections_rejected_total";

/// Syslog: 수신한 프레임 수 (counter)
pub const SYSLOG_MESSAGES_RECEIVED_TOTAL: &str = "syslogidx_syslog_messages_received_total";

/// Syslog: 파싱 실패로 건너뛴 프레임 수 (counter)
pub const SYSLOG_PARSE_ERRORS_TOTAL: &str = "syslogidx_syslog_parse_errors_total";

/// Syslog: 인덱싱 시도 수 (counter, label: result)
pub const SYSLOG_DOCUMENTS_INDEXED_TOTAL: &str = "syslogidx_syslog_documents_indexed_total";

/// Syslog: 앱 분류 결정/전환 수 (counter, label: classification)
pub const SYSLOG_CLASSIFICATIONS_TOTAL: &str = "syslogidx_syslog_classifications_total";

// ─── CloudTrail ─────────────────────────────────────────────────────

/// CloudTrail: 수신한 큐 메시지 수 (counter)
pub const CLOUDTRAIL_MESSAGES_RECEIVED_TOTAL: &str = "syslogidx_cloudtrail_messages_received_total";

/// CloudTrail: 삭제(확인)된 큐 메시지 수 (counter)
pub const CLOUDTRAIL_MESSAGES_DELETED_TOTAL: &str = "syslogidx_cloudtrail_messages_deleted_total";

/// CloudTrail: 재전달을 위해 남겨둔 큐 메시지 수 (counter)
pub const CLOUDTRAIL_MESSAGES_RETAINED_TOTAL: &str = "syslogidx_cloudtrail_messages_retained_total";

/// CloudTrail: 인덱싱된 레코드 수 (counter)
pub const CLOUDTRAIL_RECORDS_INDEXED_TOTAL: &str = "syslogidx_cloudtrail_records_indexed_total";

/// CloudTrail: 실패한 오브젝트 수 (counter)
pub const CLOUDTRAIL_OBJECT_FAILURES_TOTAL: &str = "syslogidx_cloudtrail_object_failures_total";

/// CloudTrail: 큐 수신 실패 수 (counter)
pub const CLOUDTRAIL_RECEIVE_ERRORS_TOTAL: &str = "syslogidx_cloudtrail_receive_errors_total";

// ─── Retention ──────────────────────────────────────────────────────

/// Retention: 실행된 스윕 수 (counter, label: result)
pub const RETENTION_SWEEPS_TOTAL: &str = "syslogidx_retention_sweeps_total";

/// Retention: 삭제된 인덱스 수 (counter)
pub const RETENTION_INDICES_DELETED_TOTAL: &str = "syslogidx_retention_indices_deleted_total";

/// Retention: 인덱스 삭제 실패 수 (counter)
pub const RETENTION_DELETE_FAILURES_TOTAL: &str = "syslogidx_retention_delete_failures_total";

// ─── Daemon ─────────────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "syslogidx_daemon_uptime_seconds";

/// Daemon: 등록된 플러그인 수 (gauge)
pub const DAEMON_PLUGINS_REGISTERED: &str = "syslogidx_daemon_plugins_registered";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "syslogidx_daemon_build_info";

/// 모든 메트릭의 HELP 텍스트를 등록합니다.
///
/// 전역 레코더 설치 직후 데몬에서 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    // Syslog
    describe_gauge!(SYSLOG_CONNECTIONS_ACTIVE, "Open syslog TCP connections");
    describe_counter!(
        SYSLOG_CONNECTIONS_REJECTED_TOTAL,
        "Syslog connections rejected because the connection limit was reached"
    );
    describe_counter!(
        SYSLOG_MESSAGES_RECEIVED_TOTAL,
        "Syslog frames received over TCP"
    );
    describe_counter!(
        SYSLOG_PARSE_ERRORS_TOTAL,
        "Syslog frames skipped because they failed RFC 5424 parsing"
    );
    describe_counter!(
        SYSLOG_DOCUMENTS_INDEXED_TOTAL,
        "Syslog documents sent to the index backend, by result"
    );
    describe_counter!(
        SYSLOG_CLASSIFICATIONS_TOTAL,
        "Per-app JSON classification decisions and demotions"
    );

    // CloudTrail
    describe_counter!(
        CLOUDTRAIL_MESSAGES_RECEIVED_TOTAL,
        "CloudTrail notifications received from the queue"
    );
    describe_counter!(
        CLOUDTRAIL_MESSAGES_DELETED_TOTAL,
        "CloudTrail notifications acknowledged after every record was indexed"
    );
    describe_counter!(
        CLOUDTRAIL_MESSAGES_RETAINED_TOTAL,
        "CloudTrail notifications left on the queue for redelivery"
    );
    describe_counter!(
        CLOUDTRAIL_RECORDS_INDEXED_TOTAL,
        "CloudTrail records indexed"
    );
    describe_counter!(
        CLOUDTRAIL_OBJECT_FAILURES_TOTAL,
        "CloudTrail log objects that failed to fetch, decode or index"
    );
    describe_counter!(
        CLOUDTRAIL_RECEIVE_ERRORS_TOTAL,
        "Failed queue receive calls"
    );

    // Retention
    describe_counter!(RETENTION_SWEEPS_TOTAL, "Retention sweeps run, by result");
    describe_counter!(
        RETENTION_INDICES_DELETED_TOTAL,
        "Dated indices deleted by the retention sweep"
    );
    describe_counter!(
        RETENTION_DELETE_FAILURES_TOTAL,
        "Dated indices the retention sweep failed to delete"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Daemon uptime in seconds");
    describe_gauge!(
        DAEMON_PLUGINS_REGISTERED,
        "Number of components registered with the daemon"
    );
    describe_gauge!(DAEMON_BUILD_INFO, "Build information (always 1)");
}
