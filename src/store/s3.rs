//! Anonymous S3 object store backed by `aws-sdk-s3`.

use std::path::Path;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::{ListPage, ListRequest, ObjectStore, ObjectSummary, StoreError};
use crate::config::StoreConfig;

/// Read-only S3 client bound to a single bucket.
///
/// Requests are sent unsigned, which is what the NOAA open data buckets
/// expect. The client is cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Builds a client from `config`.
    ///
    /// A custom `endpoint_url` switches to path-style addressing so
    /// S3-compatible servers (and local mocks) can be targeted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) if the configuration is invalid.
    #[instrument(level = "debug", skip(config), fields(bucket = %config.bucket, region = %config.region))]
    pub async fn connect(config: &StoreConfig) -> Result<Self, crate::ConfigError> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .no_credentials()
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts));
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        debug!(
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            max_attempts = config.max_attempts,
            "created S3 client"
        );

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[instrument(level = "trace", skip(self, request), fields(prefix = %request.prefix))]
    async fn list_page(
        &self,
        request: &ListRequest,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut call = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&request.prefix);
        if let Some(delimiter) = &request.delimiter {
            call = call.delimiter(delimiter);
        }
        if let Some(max_keys) = request.max_keys {
            call = call.max_keys(max_keys);
        }
        if let Some(token) = continuation {
            call = call.continuation_token(token);
        }

        let output = call
            .send()
            .await
            .map_err(|e| StoreError::listing(&self.bucket, &request.prefix, describe(&e)))?;

        let common_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|common| common.prefix().map(str::to_string))
            .collect();
        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectSummary::new(key, object.size().unwrap_or(0)))
            })
            .collect();
        let next_token = if output.is_truncated() == Some(true) {
            output.next_continuation_token().map(String::from)
        } else {
            None
        };

        Ok(ListPage {
            common_prefixes,
            objects,
            next_token,
        })
    }

    #[instrument(level = "debug", skip(self, destination), fields(dest = %destination.display()))]
    async fn fetch_to_file(&self, key: &str, destination: &Path) -> Result<u64, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::retrieval(&self.bucket, key, describe(&e)))?;

        // The SDK pulls large bodies in chunks; copy them straight to disk.
        let mut body = output.body.into_async_read();
        let mut file = File::create(destination)
            .await
            .map_err(|e| StoreError::io(destination, e))?;
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|e| StoreError::retrieval(&self.bucket, key, e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::io(destination, e))?;

        debug!(bytes = written, "object written");
        Ok(written)
    }
}

/// One-line summary of a failed request.
///
/// Service errors keep the S3 error code, message and HTTP status; the full
/// SDK context only goes to the debug log.
fn describe<E>(err: &SdkError<E, HttpResponse>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    debug!(error = %DisplayErrorContext(err), "S3 request failed");

    if let SdkError::ServiceError(service) = err {
        let status = service.raw().status().as_u16();
        return match (err.code(), err.message()) {
            (Some(code), Some(message)) => format!("{code}: {message} (HTTP {status})"),
            (Some(code), None) => format!("{code} (HTTP {status})"),
            _ => format!("HTTP {status}"),
        };
    }
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}
