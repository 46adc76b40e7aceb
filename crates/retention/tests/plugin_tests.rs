//! 보존 정책 플러그인 통합 테스트 (가상 시간)

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use syslogidx_core::backend::{AliasInfo, Document, IndexBackend};
use syslogidx_core::error::BackendError;
use syslogidx_core::plugin::{Plugin, PluginState};
use syslogidx_retention::{RetentionSweep, SweepConfig};

/// 날짜 인덱스를 보관하고 삭제하는 가짜 클러스터
struct Cluster {
    indices: Mutex<Vec<String>>,
    listings: AtomicUsize,
}

impl Cluster {
    fn with_days(days: u32) -> Self {
        let indices = (1..=days).map(|d| format!("log-2024.01.{d:02}")).collect();
        Self {
            indices: Mutex::new(indices),
            listings: AtomicUsize::new(0),
        }
    }

    fn remaining(&self) -> Vec<String> {
        let mut names = self.indices.lock().unwrap().clone();
        names.sort();
        names
    }
}

impl IndexBackend for Cluster {
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
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .indices
            .lock()
            .unwrap()
            .iter()
            .map(|name| (name.clone(), AliasInfo::default()))
            .collect())
    }

    async fn delete_index(&self, name: &str) -> Result<(), BackendError> {
        self.indices.lock().unwrap().retain(|n| n != name);
        Ok(())
    }
}

fn config(retain_days: u32, interval_secs: u64, max_jitter_secs: u64) -> SweepConfig {
    SweepConfig {
        retain_days,
        interval: Duration::from_secs(interval_secs),
        max_jitter: Duration::from_secs(max_jitter_secs),
    }
}

#[tokio::test(start_paused = true)]
async fn test_sweeps_after_jitter_then_every_interval() {
    let cluster = Arc::new(Cluster::with_days(5));
    let mut plugin = RetentionSweep::new(config(3, 100, 10), Arc::clone(&cluster));
    plugin.init().await.unwrap();
    plugin.start().await.unwrap();

    // jitter < 10s
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(cluster.listings.load(Ordering::SeqCst), 1);
    assert_eq!(
        cluster.remaining(),
        vec!["log-2024.01.03", "log-2024.01.04", "log-2024.01.05"]
    );
    let report = plugin.last_report().unwrap();
    assert_eq!(report.deleted, vec!["log-2024.01.01", "log-2024.01.02"]);
    assert!(plugin.health_check().await.is_healthy());

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(cluster.listings.load(Ordering::SeqCst), 2);

    plugin.stop().await.unwrap();
    assert_eq!(plugin.state(), PluginState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_zero_retain_days_never_sweeps() {
    let cluster = Arc::new(Cluster::with_days(5));
    let mut plugin = RetentionSweep::new(config(0, 100, 0), Arc::clone(&cluster));
    plugin.init().await.unwrap();
    plugin.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(1_000)).await;
    assert_eq!(cluster.listings.load(Ordering::SeqCst), 0);
    assert_eq!(cluster.remaining().len(), 5);
    assert!(plugin.health_check().await.is_healthy());

    plugin.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_cancels_pending_jitter() {
    let cluster = Arc::new(Cluster::with_days(5));
    let mut plugin = RetentionSweep::new(config(1, 86_400, 7_200), Arc::clone(&cluster));
    plugin.init().await.unwrap();
    plugin.start().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), plugin.stop())
        .await
        .expect("stop should not wait for the sweep timer")
        .unwrap();
    assert_eq!(plugin.state(), PluginState::Stopped);
}

#[tokio::test]
async fn test_invalid_interval_fails_init() {
    let cluster = Arc::new(Cluster::with_days(1));
    let mut plugin = RetentionSweep::new(config(3, 0, 0), cluster);
    assert!(plugin.init().await.is_err());
    assert_eq!(plugin.state(), PluginState::Failed);
}
