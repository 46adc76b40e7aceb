//! 인덱스 백엔드 추상화
//!
//! 모든 컴포넌트는 [`IndexBackend`]를 통해 기록합니다. 클라이언트는 리스너,
//! CloudTrail 인덱서, 보존 스윕이 별도 잠금 없이 `Arc`로 공유하므로
//! 구현체는 동시 호출에 안전해야 합니다.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// 문서 하나로 색인되는 필드 맵
pub type Document = serde_json::Map<String, serde_json::Value>;

/// 백엔드가 나열한 인덱스 하나의 alias 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasInfo {
    #[serde(default)]
    pub aliases: HashMap<String, serde_json::Value>,
}

/// 검색 인덱스 저장소 연산
pub trait IndexBackend: Send + Sync + 'static {
    /// 필드 맵을 `index`에 `doc_type`으로 색인합니다.
    ///
    /// `event_time`은 문서 타임스탬프로 백엔드에 전달됩니다.
    fn index(
        &self,
        index: &str,
        doc_type: &str,
        fields: &Document,
        event_time: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// 이미 직렬화된 JSON 문서를 색인합니다.
    ///
    /// `doc_id`가 있으면 같은 id의 기존 문서를 덮어씁니다.
    fn index_json(
        &self,
        index: &str,
        doc_type: &str,
        doc_id: Option<&str>,
        raw: &[u8],
        event_time: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// 모든 인덱스 이름과 alias 목록을 조회합니다.
    fn aliases(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, AliasInfo>, BackendError>> + Send;

    /// 인덱스 하나를 삭제합니다.
    fn delete_index(&self, name: &str) -> impl Future<Output = Result<(), BackendError>> + Send;
}
