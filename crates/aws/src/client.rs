//! Signed HTTP plumbing shared by the SQS and S3 clients.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Request, Response, Url};
use syslogidx_core::error::TransportError;

use crate::credentials::Credentials;
use crate::sigv4::Signer;

/// Longest error body kept in `TransportError::Status`.
const MAX_ERROR_BODY: usize = 1024;

/// One AWS service endpoint plus the identity used to sign requests to it.
#[derive(Debug, Clone)]
pub(crate) struct ServiceClient {
    http: Client,
    endpoint: Url,
    region: String,
    service: &'static str,
    credentials: Credentials,
}

impl ServiceClient {
    pub(crate) fn new(
        endpoint: &str,
        region: &str,
        service: &'static str,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TransportError::Request(format!("invalid endpoint '{endpoint}': {e}")))?;
        if endpoint.cannot_be_a_base() || endpoint.host_str().is_none() {
            return Err(TransportError::Request(format!(
                "invalid endpoint '{endpoint}': not a base URL"
            )));
        }

        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            region: region.to_owned(),
            service,
            credentials,
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Signs and sends `request`, mapping transport errors and non-2xx
    /// statuses.
    pub(crate) async fn send(
        &self,
        mut request: Request,
        payload_hash: &str,
    ) -> Result<Response, TransportError> {
        Signer::new(&self.credentials, &self.region, self.service).sign(
            &mut request,
            payload_hash,
            Utc::now(),
        )?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

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
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// `https://{service}.{region}.amazonaws.com/` unless `configured` is set.
pub(crate) fn endpoint_or_default(configured: &str, service: &str, region: &str) -> String {
    if configured.trim().is_empty() {
        format!("https://{service}.{region}.amazonaws.com/")
    } else {
        configured.to_owned()
    }
}
