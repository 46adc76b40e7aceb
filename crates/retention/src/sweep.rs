//! 한 번의 보존 정책 스윕

use metrics::counter;
use syslogidx_core::backend::IndexBackend;
use syslogidx_core::metrics as m;
use syslogidx_core::types::is_dated_index;
use tracing::{error, info, warn};

/// 스윕 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 삭제한 인덱스 (오래된 순)
    pub deleted: Vec<String>,
    /// 삭제에 실패한 인덱스
    pub failed: Vec<String>,
    /// 남겨둔 날짜 인덱스 수
    pub kept: usize,
    /// 목록 조회 실패 사유 (실패하면 아무것도 삭제하지 않음)
    pub listing_error: Option<String>,
}

impl SweepReport {
    /// 목록 조회와 모든 삭제가 성공했는지 확인합니다.
    pub fn is_clean(&self) -> bool {
        self.listing_error.is_none() && self.failed.is_empty()
    }
}

/// 인덱스 이름 목록에서 삭제할 인덱스를 고릅니다.
///
/// 날짜 인덱스만 대상으로 하며, 정렬 후 최신 `retain`개를 남긴 나머지를 오래된 순으로
/// 반환합니다. 두 번째 값은 남겨둔 날짜 인덱스 수입니다.
pub fn select_expired<I, S>(names: I, retain: usize) -> (Vec<String>, usize)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut dated: Vec<String> = names
        .into_iter()
        .map(Into::into)
        .filter(|name| is_dated_index(name))
        .collect();
    dated.sort();

    if dated.len() <= retain {
        let kept = dated.len();
        return (Vec::new(), kept);
    }
    let expired_count = dated.len() - retain;
    let kept = dated.split_off(expired_count);
    (dated, kept.len())
}

/// 최신 `retain_days`개의 날짜 인덱스만 남기고 나머지를 삭제합니다.
///
/// 목록 조회 실패나 개별 삭제 실패는 로그로 남기고 결과에 기록합니다. 삭제 하나가
/// 실패해도 나머지 삭제는 계속합니다.
pub async fn sweep<B: IndexBackend>(backend: &B, retain_days: u32) -> SweepReport {
    let aliases = match backend.aliases().await {
        Ok(aliases) => aliases,
        Err(e) => {
            error!(error = %e, "failed to list indices for retention");
            counter!(m::RETENTION_SWEEPS_TOTAL, m::LABEL_RESULT => "failure").increment(1);
            return SweepReport {
                listing_error: Some(e.to_string()),
                ..Default::default()
            };
        }
    };

    let (expired, kept) = select_expired(aliases.into_keys(), retain_days as usize);
    let mut report = SweepReport {
        kept,
        ..Default::default()
    };

    for index in expired {
        match backend.delete_index(&index).await {
            Ok(()) => {
                info!(index = %index, "deleted expired index");
                counter!(m::RETENTION_INDICES_DELETED_TOTAL).increment(1);
                report.deleted.push(index);
            }
            Err(e) => {
                warn!(index = %index, error = %e, "failed to delete expired index");
                counter!(m::RETENTION_DELETE_FAILURES_TOTAL).increment(1);
                report.failed.push(index);
            }
        }
    }

    let result = if report.is_clean() { "success" } else { "failure" };
    counter!(m::RETENTION_SWEEPS_TOTAL, m::LABEL_RESULT => result).increment(1);
    info!(
        retain_days,
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        kept = report.kept,
        "retention sweep finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};
    use syslogidx_core::backend::{AliasInfo, Document};
    use syslogidx_core::error::BackendError;

    use super::*;

    struct FakeCluster {
        indices: Vec<&'static str>,
        fail_listing: bool,
        fail_delete: Vec<&'static str>,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeCluster {
        fn new(indices: Vec<&'static str>) -> Self {
            Self {
                indices,
                fail_listing: false,
                fail_delete: Vec::new(),
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    impl IndexBackend for FakeCluster {
        async fn index(
            &self,
            _index: &str,
            _doc_type: &str,
            _fields: &Document,
            _event_time: DateTime<Utc>,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        async fn index_json(
            &self,
            _index: &str,
            _doc_type: &str,
            _doc_id: Option<&str>,
            _raw: &[u8],
            _event_time: DateTime<Utc>,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        async fn aliases(&self) -> Result<HashMap<String, AliasInfo>, BackendError> {
            if self.fail_listing {
                return Err(BackendError::Request("connection refused".to_owned()));
            }
            Ok(self
                .indices
                .iter()
                .map(|name| (name.to_string(), AliasInfo::default()))
                .collect())
        }

        async fn delete_index(&self, name: &str) -> Result<(), BackendError> {
            if self.fail_delete.iter().any(|n| *n == name) {
                return Err(BackendError::Status {
                    status: 500,
                    body: "boom".to_owned(),
                });
            }
            self.deleted.lock().unwrap().push(name.to_owned());
            Ok(())
        }
    }

    #[test]
    fn select_expired_keeps_newest() {
        let names = [
            "log-2024.03.03",
            "log-2024.03.01",
            "log-2024.03.04",
            "log-2024.03.02",
        ];
        let (expired, kept) = select_expired(names, 2);
        assert_eq!(expired, vec!["log-2024.03.01", "log-2024.03.02"]);
        assert_eq!(kept, 2);
    }

    #[test]
    fn select_expired_ignores_non_dated_names() {
        let names = [
            ".kibana",
            "log-2024.03.1",
            "log-2024.03.011",
            "logs-2024.03.0",
            "log-2024.03.01",
            "log-2024.03.02",
        ];
        let (expired, kept) = select_expired(names, 1);
        assert_eq!(expired, vec!["log-2024.03.01"]);
        assert_eq!(kept, 1);
    }

    #[test]
    fn select_expired_under_limit_deletes_nothing() {
        let (expired, kept) = select_expired(["log-2024.03.01", "log-2024.03.02"], 2);
        assert!(expired.is_empty());
        assert_eq!(kept, 2);

        let (expired, kept) = select_expired(Vec::<String>::new(), 60);
        assert!(expired.is_empty());
        assert_eq!(kept, 0);
    }

    #[test]
    fn select_expired_zero_retain_expires_all() {
        let (expired, kept) = select_expired(["log-2024.03.02", "log-2024.03.01"], 0);
        assert_eq!(expired, vec!["log-2024.03.01", "log-2024.03.02"]);
        assert_eq!(kept, 0);
    }

    #[tokio::test]
    async fn sweep_deletes_oldest_beyond_window() {
        let cluster = FakeCluster::new(vec![
            "log-2024.02.28",
            "log-2024.02.29",
            "log-2024.03.01",
            "log-2024.03.02",
            ".kibana",
        ]);
        let report = sweep(&cluster, 3).await;
        assert_eq!(report.deleted, vec!["log-2024.02.28"]);
        assert_eq!(report.kept, 3);
        assert!(report.is_clean());
        assert_eq!(*cluster.deleted.lock().unwrap(), vec!["log-2024.02.28"]);
    }

    #[tokio::test]
    async fn sweep_continues_after_delete_failure() {
        let mut cluster = FakeCluster::new(vec![
            "log-2024.03.01",
            "log-2024.03.02",
            "log-2024.03.03",
            "log-2024.03.04",
        ]);
        cluster.fail_delete = vec!["log-2024.03.01"];
        let report = sweep(&cluster, 1).await;
        assert_eq!(report.failed, vec!["log-2024.03.01"]);
        assert_eq!(report.deleted, vec!["log-2024.03.02", "log-2024.03.03"]);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn sweep_listing_failure_deletes_nothing() {
        let mut cluster = FakeCluster::new(vec!["log-2024.03.01", "log-2024.03.02"]);
        cluster.fail_listing = true;
        let report = sweep(&cluster, 1).await;
        assert!(report.listing_error.is_some());
        assert!(report.deleted.is_empty());
        assert!(cluster.deleted.lock().unwrap().is_empty());
    }
}
