//! 큐 메시지 하나를 끝까지 처리하는 배치 처리기
//!
//! 메시지가 가리키는 오브젝트를 순서대로 인덱싱하고, 실패가 0건일 때만 메시지를
//! 삭제합니다. 실패한 오브젝트는 건너뛰고 다음 오브젝트를 계속 처리합니다.

use std::sync::Arc;

use metrics::counter;
use sha2::{Digest, Sha256};
use syslogidx_core::backend::IndexBackend;
use syslogidx_core::error::TransportError;
use syslogidx_core::metrics as m;
use syslogidx_core::queue::{QueueClient, QueueMessage};
use syslogidx_core::storage::ObjectStore;
use syslogidx_core::types::index_name_for;
use tracing::{debug, error, info, warn};

use crate::bundle::{RecordStream, enrich, event_time};
use crate::config::IndexerConfig;
use crate::error::CloudTrailError;
use crate::notification::CloudTrailNotification;

/// 메시지 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// 모든 레코드를 인덱싱하고 메시지를 삭제함
    Deleted { records: usize },
    /// 실패한 오브젝트가 있어 재전달을 위해 남겨둠
    Retained { failures: usize },
    /// 본문을 알림으로 디코딩할 수 없어 남겨둠
    Undecodable,
    /// 인덱싱은 끝났지만 삭제 요청이 실패함
    DeleteFailed,
}

/// 오브젝트 키와 레코드 위치에서 유도한 문서 ID
///
/// `hex(SHA-256("{bucket}/{key}#{offset}"))`
pub fn document_id(bucket: &str, key: &str, offset: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bucket.as_bytes());
    hasher.update(b"/");
    hasher.update(key.as_bytes());
    hasher.update(b"#");
    hasher.update(offset.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// CloudTrail 배치 처리기
pub struct BatchProcessor<Q, S, B> {
    config: IndexerConfig,
    queue: Arc<Q>,
    store: Arc<S>,
    backend: Arc<B>,
}

impl<Q, S, B> BatchProcessor<Q, S, B>
where
    Q: QueueClient,
    S: ObjectStore,
    B: IndexBackend,
{
    pub fn new(config: IndexerConfig, queue: Arc<Q>, store: Arc<S>, backend: Arc<B>) -> Self {
        Self {
            config,
            queue,
            store,
            backend,
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// 설정된 큐 이름을 URL로 조회합니다.
    pub async fn resolve_queue_url(&self) -> Result<String, CloudTrailError> {
        self.queue
            .get_queue_url(&self.config.queue_name)
            .await
            .map_err(|source| CloudTrailError::QueueUrl {
                queue: self.config.queue_name.clone(),
                source,
            })
    }

    /// 한 번 수신하고 받은 메시지를 모두 처리합니다.
    ///
    /// 받은 메시지 수를 반환합니다. 0이면 호출자가 idle 백오프를 적용합니다.
    pub async fn poll_once(&self, queue_url: &str) -> Result<usize, TransportError> {
        let messages = self
            .queue
            .receive_message(
                queue_url,
                &[],
                self.config.max_messages,
                self.config.visibility_timeout_secs,
                self.config.wait_time_secs,
            )
            .await?;

        for message in &messages {
            self.process_message(queue_url, message).await;
        }
        Ok(messages.len())
    }

    /// 메시지 하나를 처리합니다. 실패는 로그와 메트릭으로만 보고합니다.
    pub async fn process_message(&self, queue_url: &str, message: &QueueMessage) -> MessageOutcome {
        counter!(m::CLOUDTRAIL_MESSAGES_RECEIVED_TOTAL).increment(1);

        let note = match CloudTrailNotification::from_queue_body(&message.body) {
            Ok(note) => note,
            Err(e) => {
                warn!(
                    message_id = %message.message_id,
                    error = %e,
                    "skipping undecodable queue message"
                );
                counter!(m::CLOUDTRAIL_MESSAGES_RETAINED_TOTAL).increment(1);
                return MessageOutcome::Undecodable;
            }
        };

        let mut failures = 0;
        let mut records = 0;
        for key in &note.s3_object_key {
            match self.index_object(&note.s3_bucket, key).await {
                Ok(count) => {
                    debug!(bucket = %note.s3_bucket, key = %key, records = count, "indexed log object");
                    records += count;
                }
                Err(e) => {
                    failures += 1;
                    counter!(m::CLOUDTRAIL_OBJECT_FAILURES_TOTAL).increment(1);
                    error!(bucket = %note.s3_bucket, key = %key, error = %e, "failed to index log object");
                }
            }
        }

        if failures > 0 {
            warn!(
                message_id = %message.message_id,
                failures,
                "leaving message for redelivery"
            );
            counter!(m::CLOUDTRAIL_MESSAGES_RETAINED_TOTAL).increment(1);
            return MessageOutcome::Retained { failures };
        }

        if let Err(e) = self
            .queue
            .delete_message(queue_url, &message.receipt_handle)
            .await
        {
            error!(message_id = %message.message_id, error = %e, "failed to delete message");
            return MessageOutcome::DeleteFailed;
        }

        counter!(m::CLOUDTRAIL_MESSAGES_DELETED_TOTAL).increment(1);
        info!(
            message_id = %message.message_id,
            objects = note.s3_object_key.len(),
            records,
            "cloudtrail notification indexed"
        );
        MessageOutcome::Deleted { records }
    }

    /// 오브젝트 하나의 레코드를 파일 순서대로 인덱싱합니다.
    ///
    /// 첫 실패에서 멈추고 에러를 반환합니다. 이미 인덱싱된 레코드는 되돌리지 않습니다.
    pub async fn index_object(&self, bucket: &str, key: &str) -> Result<usize, CloudTrailError> {
        let reader = self
            .store
            .get_reader(bucket, key)
            .await
            .map_err(|source| CloudTrailError::Fetch {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                source,
            })?;

        let mut records = RecordStream::spawn(reader);
        let mut offset = 0;
        while let Some(record) = records.next().await? {
            let time = event_time(&record).ok_or(CloudTrailError::MissingEventTime { offset })?;
            let index = index_name_for(&time);
            let body = enrich(record, &time, &self.config.app_tag)?;
            let id = self
                .config
                .idempotent_ids
                .then(|| document_id(bucket, key, offset));

            self.backend
                .index_json(&index, &self.config.doc_type, id.as_deref(), &body, time)
                .await
                .map_err(|source| CloudTrailError::Index { offset, source })?;

            counter!(m::CLOUDTRAIL_RECORDS_INDEXED_TOTAL).increment(1);
            offset += 1;
        }
        Ok(offset)
    }
}
