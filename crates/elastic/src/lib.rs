#![doc = include_str!("../README.md")]

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use syslogidx_core::backend::{AliasInfo, Document, IndexBackend};
use syslogidx_core::config::ElasticsearchConfig;
use syslogidx_core::error::BackendError;
use tracing::debug;

/// Longest error body kept in `BackendError::Status`.
const MAX_ERROR_BODY: usize = 1024;

/// Elasticsearch index backend.
#[derive(Debug, Clone)]
pub struct ElasticSearch {
    client: Client,
    base: Url,
}

impl ElasticSearch {
    /// Creates a client for the cluster at `url` with the given request timeout.
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, BackendError> {
        let base = Url::parse(url)
            .map_err(|e| BackendError::Request(format!("invalid endpoint '{url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Request(format!(
                "invalid endpoint '{url}': not a base URL"
            )));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self { client, base })
    }

    /// Creates a client from the `[elasticsearch]` config section.
    pub fn from_config(config: &ElasticsearchConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url(segments))
    }

    fn document_request(
        &self,
        index: &str,
        doc_type: &str,
        doc_id: Option<&str>,
        event_time: DateTime<Utc>,
    ) -> RequestBuilder {
        let builder = match doc_id {
            Some(id) => self.request(Method::PUT, &[index, doc_type, id]),
            None => self.request(Method::POST, &[index, doc_type]),
        };
        builder.query(&[(
            "timestamp",
            event_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )])
    }
}

/// Sends the request and maps transport errors and non-2xx statuses.
async fn send(builder: RequestBuilder) -> Result<Response, BackendError> {
    let response = builder
        .send()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

impl IndexBackend for ElasticSearch {
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        fields: &Document,
        event_time: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let body = serde_json::to_vec(fields).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.index_json(index, doc_type, None, &body, event_time)
            .await
    }

    async fn index_json(
        &self,
        index: &str,
        doc_type: &str,
        doc_id: Option<&str>,
        raw: &[u8],
        event_time: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let request = self
            .document_request(index, doc_type, doc_id, event_time)
            .header(CONTENT_TYPE, "application/json")
            .body(raw.to_vec());
        send(request).await?;
        debug!(index, doc_type, id = doc_id, bytes = raw.len(), "indexed document");
        Ok(())
    }

    async fn aliases(&self) -> Result<HashMap<String, AliasInfo>, BackendError> {
        let response = send(self.request(Method::GET, &["_aliases"])).await?;
        response
            .json::<HashMap<String, AliasInfo>>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn delete_index(&self, name: &str) -> Result<(), BackendError> {
        send(self.request(Method::DELETE, &[name])).await?;
        debug!(index = name, "deleted index");
        Ok(())
    }
}
