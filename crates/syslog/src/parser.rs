//! Syslog RFC 5424 파서
//!
//! [RFC 5424](https://tools.ietf.org/html/rfc5424) 형식의 프레임 하나를 [`LogParts`]로 변환합니다.
//!
//! # 메시지 형식
//! ```text
//! <PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID STRUCTURED-DATA [MSG]
//! ```
//!
//! # 사용 예시
//! ```
//! use syslogidx_syslog::parser::Rfc5424Parser;
//!
//! let parser = Rfc5424Parser::new();
//! let parts = parser
//!     .parse(b"<34>1 2024-01-15T12:00:00Z myhost sshd 1234 - - Failed password")
//!     .unwrap();
//! assert_eq!(parts.app_name, "sshd");
//! assert_eq!(parts.facility, 4);
//! assert_eq!(parts.severity, 2);
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use syslogidx_core::types::LogParts;

use crate::error::SyslogError;

/// RFC 5424에서 유효한 최대 PRI 값
/// facility 최댓값 23 * 8 + severity 최댓값 7 = 191
const MAX_SYSLOG_PRI: u8 = 191;

/// MSG 앞에 올 수 있는 UTF-8 BOM
const BOM: char = '\u{FEFF}';

/// Syslog RFC 5424 파서
///
/// ## 처리 규칙
/// - PRI에서 facility/severity 디코딩
/// - NILVALUE (`-`)는 빈 문자열로 변환, 타임스탬프가 `-`이면 수신 시각 사용
/// - Structured Data는 대괄호 원문 그대로 보존
/// - SD 뒤의 구분 공백 하나만 제거하고 나머지 MSG는 그대로 유지
#[derive(Debug, Clone, Default)]
pub struct Rfc5424Parser;

impl Rfc5424Parser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 프레임 하나를 파싱합니다.
    ///
    /// 프레임 끝의 `\r`/`\n`은 무시합니다. 유효하지 않은 UTF-8은 대체 문자로 바뀝니다.
    pub fn parse(&self, raw: &[u8]) -> Result<LogParts, SyslogError> {
        let input = String::from_utf8_lossy(raw);
        let input = input.trim_end_matches(['\r', '\n']);

        if input.is_empty() {
            return Err(SyslogError::parse(0, "empty input"));
        }

        // PRI 파싱: <NNN>
        if !input.starts_with('<') {
            return Err(SyslogError::parse(0, "missing PRI field (expected '<')"));
        }

        let pri_end = input
            .find('>')
            .ok_or_else(|| SyslogError::parse(0, "unterminated PRI field"))?;

        let pri_str = &input[1..pri_end];
        if pri_str.is_empty() || pri_str.len() > 3 || !pri_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(SyslogError::parse(1, format!("invalid PRI value: '{pri_str}'")));
        }
        let pri: u8 = pri_str
            .parse()
            .map_err(|_| SyslogError::parse(1, format!("invalid PRI value: '{pri_str}'")))?;

        if pri > MAX_SYSLOG_PRI {
            return Err(SyslogError::parse(
                1,
                format!("PRI value {pri} out of valid range (0-{MAX_SYSLOG_PRI})"),
            ));
        }

        let (facility, severity) = decode_pri(pri);

        // VERSION 확인
        let version_offset = pri_end + 1;
        let body = input[version_offset..].strip_prefix("1 ").ok_or_else(|| {
            SyslogError::parse(version_offset, "unsupported syslog version (expected '1 ')")
        })?;
        let body_offset = version_offset + 2;

        let fields: Vec<&str> = body.splitn(6, ' ').collect();
        let [timestamp, hostname, app_name, proc_id, msg_id, rest] = fields[..] else {
            return Err(SyslogError::parse(
                body_offset,
                format!(
                    "RFC 5424 requires 6 fields after version, got {}",
                    fields.len()
                ),
            ));
        };

        let timestamp = match nilvalue_to_empty(timestamp) {
            "" => Utc::now().fixed_offset(),
            ts => parse_rfc3339(ts, body_offset)?,
        };

        let sd_offset = input.len() - rest.len();
        let (structured_data, message) = split_structured_data(rest, sd_offset)?;

        Ok(LogParts {
            facility,
            severity,
            timestamp,
            hostname: nilvalue_to_empty(hostname).to_owned(),
            app_name: nilvalue_to_empty(app_name).to_owned(),
            proc_id: nilvalue_to_empty(proc_id).to_owned(),
            msg_id: nilvalue_to_empty(msg_id).to_owned(),
            structured_data: structured_data.to_owned(),
            message: message.strip_prefix(BOM).unwrap_or(message).to_owned(),
        })
    }
}

/// PRI 값에서 facility와 severity를 분리합니다.
///
/// PRI = facility * 8 + severity
fn decode_pri(pri: u8) -> (u8, u8) {
    (pri / 8, pri % 8)
}

/// NILVALUE (`-`)를 빈 문자열로 변환합니다.
fn nilvalue_to_empty(value: &str) -> &str {
    if value == "-" { "" } else { value }
}

/// RFC 3339 타임스탬프를 송신측 오프셋 그대로 파싱합니다.
fn parse_rfc3339(timestamp: &str, offset: usize) -> Result<DateTime<FixedOffset>, SyslogError> {
    DateTime::parse_from_rfc3339(timestamp).map_err(|e| {
        SyslogError::parse(
            offset,
            format!("invalid RFC 3339 timestamp '{timestamp}': {e}"),
        )
    })
}

/// STRUCTURED-DATA와 MSG를 분리합니다.
///
/// 반환값: (SD 원문, MSG). SD가 NILVALUE이면 빈 문자열을 돌려줍니다.
/// SD 요소는 연속된 `[...]` 블록이며, 따옴표 안의 `]`와 이스케이프된 문자는
/// 블록 경계로 보지 않습니다.
fn split_structured_data(input: &str, offset: usize) -> Result<(&str, &str), SyslogError> {
    if input == "-" {
        return Ok(("", ""));
    }
    if let Some(message) = input.strip_prefix("- ") {
        return Ok(("", message));
    }
    if !input.starts_with('[') {
        return Err(SyslogError::parse(
            offset,
            "structured data must be '-' or start with '['",
        ));
    }

    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }

        match ch {
            '\\' if in_quote => escaped = true,
            '"' if depth > 0 => in_quote = !in_quote,
            '[' if !in_quote => depth += 1,
            ']' if !in_quote => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !matches!(chars.peek(), Some((_, '['))) {
                    let end = idx + 1;
                    let rest = &input[end..];
                    return match rest.strip_prefix(' ') {
                        Some(message) => Ok((&input[..end], message)),
                        None if rest.is_empty() => Ok((&input[..end], "")),
                        None => Err(SyslogError::parse(
                            offset + end,
                            "expected space after structured data",
                        )),
                    };
                }
            }
            _ => {}
        }
    }

    Err(SyslogError::parse(offset, "unterminated structured data"))
}
