//! 큐 메시지 디코딩
//!
//! CloudTrail이 S3에 로그를 쓰면 SNS 토픽으로 알림을 보내고, 토픽을 구독한 SQS 큐에
//! 메시지가 쌓입니다. 메시지 본문은 SNS 봉투이고 `Message` 필드에 CloudTrail 알림이
//! JSON 문자열로 들어 있습니다.
//!
//! ```text
//! {"Type":"Notification", "Message":"{\"s3Bucket\":\"b\",\"s3ObjectKey\":[\"k1\",\"k2\"]}", ...}
//! ```

use serde::Deserialize;

use crate::error::CloudTrailError;

/// CloudTrail 로그 전달 알림
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudTrailNotification {
    #[serde(rename = "s3Bucket")]
    pub s3_bucket: String,
    /// 새로 기록된 오브젝트 키 (처리 순서 그대로)
    #[serde(rename = "s3ObjectKey", default)]
    pub s3_object_key: Vec<String>,
}

#[derive(Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Message")]
    message: String,
}

impl CloudTrailNotification {
    /// SQS 메시지 본문(SNS 봉투)에서 알림을 디코딩합니다.
    pub fn from_queue_body(body: &str) -> Result<Self, CloudTrailError> {
        let envelope: SnsEnvelope = serde_json::from_str(body)
            .map_err(|e| CloudTrailError::Notification(format!("SNS envelope: {e}")))?;
        serde_json::from_str(&envelope.message)
            .map_err(|e| CloudTrailError::Notification(format!("CloudTrail notification: {e}")))
    }
}
