//! 도메인 타입: syslog 레코드, 분류 enum, 인덱스 라우팅 키
//!
//! 인덱스 이름은 항상 레코드 자신의 이벤트 시각(UTC)에서 파생됩니다.
//! 늦게 도착한 레코드도 역사적으로 올바른 날짜 파티션에 기록됩니다.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// 날짜 파티션 인덱스 이름 접두사
pub const INDEX_PREFIX: &str = "log-";

/// 날짜 파티션 인덱스 이름 길이 (`"log-"` + `YYYY.MM.DD`)
pub const INDEX_NAME_LEN: usize = INDEX_PREFIX.len() + 10;

/// 이벤트 시각으로부터 날짜 파티션 인덱스 이름을 계산합니다.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use syslogidx_core::types::index_name_for;
///
/// let t = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
/// assert_eq!(index_name_for(&t), "log-2024.03.02");
/// ```
pub fn index_name_for(time: &DateTime<Utc>) -> String {
    format!("{INDEX_PREFIX}{}", time.format("%Y.%m.%d"))
}

/// 이름이 고정 폭 날짜 파티션 규칙(`"log-"` + 10자)을 따르는지 확인합니다.
pub fn is_dated_index(name: &str) -> bool {
    name.len() == INDEX_NAME_LEN && name.starts_with(INDEX_PREFIX)
}

// ─── Facility / Severity ─────────────────────────────────────────────

const FACILITY_NAMES: [&str; 24] = [
    "KERN", "USER", "MAIL", "DAEMON", "AUTH", "SYSLOG", "LPR", "NEWS", "UUCP", "CRON", "AUTHPRIV",
    "FTP", "NTP", "AUDIT", "ALERT", "CLOCK", "LOCAL0", "LOCAL1", "LOCAL2", "LOCAL3", "LOCAL4",
    "LOCAL5", "LOCAL6", "LOCAL7",
];

const SEVERITY_NAMES: [&str; 8] = [
    "EMERG", "ALERT", "CRIT", "ERR", "WARNING", "NOTICE", "INFO", "DEBUG",
];

/// Syslog facility (RFC 5424, 0-23)
///
/// 알 수 없는 값은 숫자 문자열로 표시됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facility(pub u8);

impl Facility {
    /// 고정 대문자 약칭 (예: `USER`)
    pub fn name(self) -> Cow<'static, str> {
        match FACILITY_NAMES.get(usize::from(self.0)) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.0.to_string()),
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Syslog severity (RFC 5424, 0-7)
///
/// 알 수 없는 값은 숫자 문자열로 표시됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Severity(pub u8);

impl Severity {
    /// 고정 대문자 약칭 (예: `INFO`)
    pub fn name(self) -> Cow<'static, str> {
        match SEVERITY_NAMES.get(usize::from(self.0)) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.0.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ─── LogParts / LogEntry ─────────────────────────────────────────────

/// Syslog 와이어 파서가 한 레코드에서 추출한 필드 묶음
///
/// 타임스탬프는 송신측 오프셋을 그대로 유지합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct LogParts {
    pub facility: u8,
    pub severity: u8,
    pub timestamp: DateTime<FixedOffset>,
    pub hostname: String,
    pub app_name: String,
    pub proc_id: String,
    pub msg_id: String,
    pub structured_data: String,
    pub message: String,
}

/// 정규화된 syslog 레코드
///
/// 인덱싱 호출 한 번 동안만 존재하며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// 이벤트 시각 (UTC)
    pub time: DateTime<Utc>,
    pub facility: Facility,
    pub severity: Severity,
    pub hostname: String,
    pub app_name: String,
    pub proc_id: String,
    pub msg_id: String,
    pub structured_data: String,
    pub message: String,
}

impl From<LogParts> for LogEntry {
    fn from(parts: LogParts) -> Self {
        Self {
            time: parts.timestamp.with_timezone(&Utc),
            facility: Facility(parts.facility),
            severity: Severity(parts.severity),
            hostname: parts.hostname,
            app_name: parts.app_name,
            proc_id: parts.proc_id,
            msg_id: parts.msg_id,
            structured_data: parts.structured_data,
            message: parts.message,
        }
    }
}

/// 인덱스 라우팅 키
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    pub index_name: String,
    pub doc_type: String,
}

impl IndexTarget {
    /// 이벤트 시각과 문서 타입으로 라우팅 키를 만듭니다.
    pub fn new(event_time: &DateTime<Utc>, doc_type: impl Into<String>) -> Self {
        Self {
            index_name: index_name_for(event_time),
            doc_type: doc_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn index_name_is_zero_padded() {
        let t = Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap();
        assert_eq!(index_name_for(&t), "log-2024.01.05");
        assert!(is_dated_index(&index_name_for(&t)));
    }

    #[test]
    fn index_name_uses_utc_date_not_local_offset() {
        // 2024-03-02T01:00:00+09:00 == 2024-03-01T16:00:00Z
        let parts = sample_parts("2024-03-02T01:00:00+09:00");
        let entry = LogEntry::from(parts);
        assert_eq!(index_name_for(&entry.time), "log-2024.03.01");
    }

    #[test]
    fn dated_index_filter() {
        assert!(is_dated_index("log-2024.03.02"));
        assert!(!is_dated_index("log-2024.3.2"));
        assert!(!is_dated_index("logs-2024.03.02"));
        assert!(!is_dated_index(".kibana"));
        assert!(!is_dated_index("log-2024.03.02-x"));
    }

    #[test]
    fn facility_names() {
        assert_eq!(Facility(0).name(), "KERN");
        assert_eq!(Facility(1).to_string(), "USER");
        assert_eq!(Facility(10).name(), "AUTHPRIV");
        assert_eq!(Facility(23).name(), "LOCAL7");
        assert_eq!(Facility(24).name(), "24");
    }

    #[test]
    fn severity_names() {
        assert_eq!(Severity(0).name(), "EMERG");
        assert_eq!(Severity(4).name(), "WARNING");
        assert_eq!(Severity(6).to_string(), "INFO");
        assert_eq!(Severity(9).name(), "9");
    }

    #[test]
    fn index_target_from_event_time() {
        let t = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let target = IndexTarget::new(&t, "restapi");
        assert_eq!(target.index_name, "log-2024.03.02");
        assert_eq!(target.doc_type, "restapi");
    }

    fn sample_parts(ts: &str) -> LogParts {
        LogParts {
            facility: 1,
            severity: 6,
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            hostname: "web1".to_owned(),
            app_name: "app".to_owned(),
            proc_id: String::new(),
            msg_id: String::new(),
            structured_data: String::new(),
            message: "hello".to_owned(),
        }
    }
}
