//! Syslog 레코드 정규화 및 인덱싱
//!
//! [`SyslogHandler`]는 파싱된 레코드 하나를 받아 분류, 필드 구성, 보강,
//! 라우팅 키 결정을 거쳐 인덱스 백엔드에 기록합니다.
//!
//! `handle`은 에러를 반환하지 않습니다. 모든 실패는 로그와 메트릭으로 남기고 버립니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde_json::Value;
use syslogidx_core::backend::{Document, IndexBackend};
use syslogidx_core::metrics as m;
use syslogidx_core::types::{IndexTarget, LogEntry, LogParts};
use tracing::{debug, error, info, warn};

use crate::classify::ClassificationCache;

/// 비 JSON 메시지의 문서 타입
pub const DEFAULT_DOC_TYPE: &str = "syslog";

/// `@host`에서 제거하는 내부 DNS 접미사
const INTERNAL_HOST_SUFFIX: &str = ".ec2.internal";

/// 페이로드에서 제거하는 예약 키
const TYPE_KEY: &str = "_type";
const IGNORED_KEYS: [&str; 2] = ["_ts", "_index"];

/// 파싱된 syslog 레코드를 문서로 바꿔 인덱싱하는 핸들러
///
/// 연결 태스크들이 `Arc`로 공유합니다.
pub struct SyslogHandler<B: IndexBackend> {
    backend: Arc<B>,
    cache: Arc<ClassificationCache>,
    app_types: BTreeMap<String, String>,
}

impl<B: IndexBackend> SyslogHandler<B> {
    /// 새 핸들러를 생성합니다.
    pub fn new(
        backend: Arc<B>,
        cache: Arc<ClassificationCache>,
        app_types: BTreeMap<String, String>,
    ) -> Self {
        Self {
            backend,
            cache,
            app_types,
        }
    }

    /// 분류 캐시에 대한 참조
    pub fn cache(&self) -> &Arc<ClassificationCache> {
        &self.cache
    }

    /// 레코드 하나를 처리합니다.
    pub async fn handle(&self, parts: LogParts) {
        let entry = LogEntry::from(parts);
        let (target, fields) = self.build_document(&entry);

        match self
            .backend
            .index(&target.index_name, &target.doc_type, &fields, entry.time)
            .await
        {
            Ok(()) => {
                metrics::counter!(m::SYSLOG_DOCUMENTS_INDEXED_TOTAL, m::LABEL_RESULT => "success")
                    .increment(1);
                debug!(
                    index = %target.index_name,
                    doc_type = %target.doc_type,
                    app = %entry.app_name,
                    "indexed syslog record"
                );
            }
            Err(e) => {
                metrics::counter!(m::SYSLOG_DOCUMENTS_INDEXED_TOTAL, m::LABEL_RESULT => "failure")
                    .increment(1);
                error!(
                    index = %target.index_name,
                    doc_type = %target.doc_type,
                    app = %entry.app_name,
                    error = %e,
                    "failed to index syslog record"
                );
            }
        }
    }

    /// 레코드를 라우팅 키와 필드 맵으로 변환합니다.
    ///
    /// 분류 캐시를 갱신하는 것 외에는 부작용이 없습니다.
    pub fn build_document(&self, entry: &LogEntry) -> (IndexTarget, Document) {
        let decoded = self.classify(entry);
        let is_json = decoded.is_some();

        let mut fields = decoded.unwrap_or_else(|| {
            let mut fields = Document::new();
            fields.insert(
                "@message".to_owned(),
                Value::String(entry.message.trim().to_owned()),
            );
            fields
        });

        enrich(&mut fields, entry);

        let payload_type = match fields.remove(TYPE_KEY) {
            Some(Value::String(t)) if !t.is_empty() => Some(t),
            _ => None,
        };
        for key in IGNORED_KEYS {
            fields.remove(key);
        }

        let doc_type = payload_type
            .or_else(|| self.app_types.get(&entry.app_name).cloned())
            .unwrap_or_else(|| {
                if is_json && !entry.app_name.is_empty() {
                    entry.app_name.clone()
                } else {
                    DEFAULT_DOC_TYPE.to_owned()
                }
            });

        (IndexTarget::new(&entry.time, doc_type), fields)
    }

    /// 캐시를 참고해 메시지를 JSON 객체로 디코딩합니다.
    fn classify(&self, entry: &LogEntry) -> Option<Document> {
        let app = entry.app_name.as_str();

        match self.cache.get(app) {
            None => {
                let decoded = decode_object(&entry.message);
                let is_json = decoded.is_some();
                if self.cache.record(app, is_json) {
                    let label = if is_json { "json" } else { "plain" };
                    metrics::counter!(m::SYSLOG_CLASSIFICATIONS_TOTAL, m::LABEL_CLASSIFICATION => label)
                        .increment(1);
                    if is_json {
                        info!(app, "white listing JSON app");
                    } else {
                        debug!(app, "classified app as plain text");
                    }
                }
                decoded
            }
            Some(true) => {
                let decoded = decode_object(&entry.message);
                if decoded.is_none() && self.cache.demote(app) {
                    metrics::counter!(m::SYSLOG_CLASSIFICATIONS_TOTAL, m::LABEL_CLASSIFICATION => "demoted")
                        .increment(1);
                    warn!(app, "Failed to parse JSON, black listing");
                }
                decoded
            }
            Some(false) => None,
        }
    }
}

/// 메시지를 JSON 객체로 디코딩합니다. 객체가 아니면 `None`.
fn decode_object(message: &str) -> Option<Document> {
    serde_json::from_str::<Document>(message.trim()).ok()
}

/// 모든 문서에 공통 메타데이터를 덮어씁니다.
fn enrich(fields: &mut Document, entry: &LogEntry) {
    let host = entry
        .hostname
        .strip_suffix(INTERNAL_HOST_SUFFIX)
        .unwrap_or(&entry.hostname);

    let meta = [
        (
            "@timestamp",
            entry.time.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("@version", "1".to_owned()),
        ("@host", host.to_owned()),
        ("@app", entry.app_name.clone()),
        ("@proc", entry.proc_id.clone()),
        ("@severity", entry.severity.name().into_owned()),
        ("@facility", entry.facility.name().into_owned()),
    ];
    for (key, value) in meta {
        fields.insert(key.to_owned(), Value::String(value));
    }
}
