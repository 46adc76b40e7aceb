//! 알림 큐 추상화

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// 큐에서 수신한 메시지 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub message_id: String,
    /// 이 전달을 확인(삭제)할 때 쓰는 핸들
    pub receipt_handle: String,
    pub body: String,
}

/// CloudTrail 인덱서가 사용하는 큐 연산
pub trait QueueClient: Send + Sync + 'static {
    /// 큐 이름을 URL로 변환합니다.
    fn get_queue_url(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// 최대 `max_messages`개의 메시지를 long polling으로 수신합니다.
    ///
    /// 수신한 메시지는 `visibility_timeout_secs` 동안 다른 소비자에게 보이지 않으며,
    /// 호출은 메시지 도착을 최대 `wait_time_secs` 동안 기다립니다.
    fn receive_message(
        &self,
        queue_url: &str,
        attribute_names: &[String],
        max_messages: u32,
        visibility_timeout_secs: u32,
        wait_time_secs: u32,
    ) -> impl Future<Output = Result<Vec<QueueMessage>, TransportError>> + Send;

    /// 전달을 확인하여 다시 전달되지 않게 합니다.
    fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
