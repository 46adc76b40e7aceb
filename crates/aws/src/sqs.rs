//! SQS client over the JSON 1.0 protocol.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};
use syslogidx_core::config::AwsConfig;
use syslogidx_core::error::TransportError;
use syslogidx_core::queue::{QueueClient, QueueMessage};
use tracing::debug;

use crate::client::{ServiceClient, endpoint_or_default};
use crate::credentials::Credentials;
use crate::sigv4::sha256_hex;

const SERVICE: &str = "sqs";
const CONTENT_TYPE_JSON_1_0: &str = "application/x-amz-json-1.0";
const TARGET_PREFIX: &str = "AmazonSQS.";

/// SQS queue client.
#[derive(Debug, Clone)]
pub struct Sqs {
    client: ServiceClient,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueueUrlRequest<'a> {
    queue_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueueUrlResponse {
    queue_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReceiveMessageRequest<'a> {
    queue_url: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    message_system_attribute_names: &'a [String],
    max_number_of_messages: u32,
    visibility_timeout: u32,
    wait_time_seconds: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ReceiveMessageResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Message {
    message_id: String,
    receipt_handle: String,
    #[serde(default)]
    body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteMessageRequest<'a> {
    queue_url: &'a str,
    receipt_handle: &'a str,
}

impl Sqs {
    /// Creates a client for the SQS endpoint in `region`.
    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = ServiceClient::new(endpoint, region, SERVICE, credentials, request_timeout)?;
        Ok(Self { client })
    }

    /// Creates a client from the `[aws]` config section.
    ///
    /// An empty `sqs_endpoint` resolves to the regional public endpoint.
    pub fn from_config(config: &AwsConfig, credentials: Credentials) -> Result<Self, TransportError> {
        let endpoint = endpoint_or_default(&config.sqs_endpoint, SERVICE, &config.region);
        Self::new(
            &endpoint,
            &config.region,
            credentials,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        self.client.endpoint()
    }

    async fn call<T: Serialize>(
        &self,
        action: &str,
        input: &T,
    ) -> Result<reqwest::Response, TransportError> {
        let body = serde_json::to_vec(input).map_err(|e| TransportError::Request(e.to_string()))?;
        let payload_hash = sha256_hex(&body);
        let target = HeaderValue::from_str(&format!("{TARGET_PREFIX}{action}"))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let request = self
            .client
            .http()
            .request(Method::POST, self.client.endpoint().clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON_1_0)
            .header("x-amz-target", target)
            .body(body)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        self.client.send(request, &payload_hash).await
    }
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(bytes).map_err(|e| TransportError::Decode(e.to_string()))
}

async fn body_bytes(response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| TransportError::Request(e.to_string()))
}

impl QueueClient for Sqs {
    async fn get_queue_url(&self, name: &str) -> Result<String, TransportError> {
        let response = self
            .call("GetQueueUrl", &GetQueueUrlRequest { queue_name: name })
            .await?;
        let out: GetQueueUrlResponse = decode(&body_bytes(response).await?)?;
        debug!(queue = name, url = %out.queue_url, "resolved queue url");
        Ok(out.queue_url)
    }

    async fn receive_message(
        &self,
        queue_url: &str,
        attribute_names: &[String],
        max_messages: u32,
        visibility_timeout_secs: u32,
        wait_time_secs: u32,
    ) -> Result<Vec<QueueMessage>, TransportError> {
        let input = ReceiveMessageRequest {
            queue_url,
            message_system_attribute_names: attribute_names,
            max_number_of_messages: max_messages,
            visibility_timeout: visibility_timeout_secs,
            wait_time_seconds: wait_time_secs,
        };
        let response = self.call("ReceiveMessage", &input).await?;
        let bytes = body_bytes(response).await?;
        // An idle long poll may come back with an empty body.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let out: ReceiveMessageResponse = decode(&bytes)?;
        Ok(out
            .messages
            .into_iter()
            .map(|m| QueueMessage {
                message_id: m.message_id,
                receipt_handle: m.receipt_handle,
                body: m.body,
            })
            .collect())
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), TransportError> {
        self.call(
            "DeleteMessage",
            &DeleteMessageRequest {
                queue_url,
                receipt_handle,
            },
        )
        .await?;
        debug!(queue_url, "deleted message");
        Ok(())
    }
}
