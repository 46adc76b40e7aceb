//! S3 object reader.

use std::io;
use std::time::Duration;

use futures::TryStreamExt;
use reqwest::Method;
use syslogidx_core::config::AwsConfig;
use syslogidx_core::error::TransportError;
use syslogidx_core::storage::{ObjectReader, ObjectStore};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::client::{ServiceClient, endpoint_or_default};
use crate::credentials::Credentials;
use crate::sigv4::{UNSIGNED_PAYLOAD, uri_encode};

const SERVICE: &str = "s3";

/// S3 client using path-style addressing.
#[derive(Debug, Clone)]
pub struct S3 {
    client: ServiceClient,
}

impl S3 {
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
    /// An empty `s3_endpoint` resolves to the regional public endpoint.
    pub fn from_config(config: &AwsConfig, credentials: Credentials) -> Result<Self, TransportError> {
        let endpoint = endpoint_or_default(&config.s3_endpoint, SERVICE, &config.region);
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

    /// `{endpoint}/{bucket}/{key}` with the key encoded segment by segment.
    fn object_url(&self, bucket: &str, key: &str) -> reqwest::Url {
        let mut url = self.client.endpoint().clone();
        let prefix = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!(
            "{prefix}/{}/{}",
            uri_encode(bucket, true),
            uri_encode(key, false)
        ));
        url.set_query(None);
        url
    }
}

impl ObjectStore for S3 {
    async fn get_reader(&self, bucket: &str, key: &str) -> Result<ObjectReader, TransportError> {
        let request = self
            .client
            .http()
            .request(Method::GET, self.object_url(bucket, key))
            .header("x-amz-content-sha256", UNSIGNED_PAYLOAD)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = self.client.send(request, UNSIGNED_PAYLOAD).await?;
        debug!(
            bucket,
            key,
            content_length = response.content_length(),
            "opened object"
        );

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> S3 {
        S3::new(
            endpoint,
            "us-east-1",
            Credentials::new("a", "b", None),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn object_url_is_path_style() {
        let s3 = client("https://s3.us-east-1.amazonaws.com/");
        assert_eq!(
            s3.object_url("trail-bucket", "AWSLogs/123/CloudTrail/x.json.gz")
                .as_str(),
            "https://s3.us-east-1.amazonaws.com/trail-bucket/AWSLogs/123/CloudTrail/x.json.gz"
        );
    }

    #[test]
    fn object_url_encodes_key_characters() {
        let s3 = client("http://127.0.0.1:4566");
        assert_eq!(
            s3.object_url("b", "dir/a b+c:d.json").as_str(),
            "http://127.0.0.1:4566/b/dir/a%20b%2Bc%3Ad.json"
        );
    }

    #[test]
    fn object_url_keeps_endpoint_path_prefix() {
        let s3 = client("http://gateway.local/s3/");
        assert_eq!(
            s3.object_url("b", "k").as_str(),
            "http://gateway.local/s3/b/k"
        );
    }
}
