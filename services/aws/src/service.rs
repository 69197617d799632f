// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! A thin client issuing signed query requests against one endpoint.

use std::sync::Arc;
use std::time::Duration;

use awsign_core::time::{format_http_date, format_rfc3339, now};
use awsign_core::{
    AttemptStrategy, Context, DefaultRetryPolicy, Error, ProvideCredential, Result,
    RetryInput, RetryPolicy, Signer, SigningRequest,
};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, DATE, HOST};
use http::uri::Scheme;
use http::{HeaderValue, Method, StatusCode, Uri};
use log::debug;
use quick_xml::de;
use serde::Deserialize;

use crate::constants::TIMESTAMP_PARAM;
use crate::{AwsSigner, Config, Credential, SignatureVersion, SigningConfig};

/// Where a service lives and how it authenticates.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Base URL, e.g. `https://sqs.us-east-1.amazonaws.com`.
    pub endpoint: String,
    /// Signing algorithm the service accepts.
    pub signature_version: SignatureVersion,
    /// Service name used by V4 scopes and operation signing.
    pub service: String,
    /// Region, required by V4. Read from [`Config::region`] when unset.
    pub region: Option<String>,
}

/// Service sends signed requests to a single AWS endpoint and retries the
/// failures worth retrying.
#[derive(Debug, Clone)]
pub struct Service {
    signer: Signer<Credential>,
    version: SignatureVersion,
    scheme: Scheme,
    host: String,
    base_path: String,
    attempts: AttemptStrategy,
    retry: Arc<dyn RetryPolicy>,
}

impl Service {
    /// Create a client for `info`, loading credentials from `provider`.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
        info: ServiceInfo,
    ) -> Result<Self> {
        let mut config = SigningConfig::new(&info.service);
        // Fall back to `AWS_REGION` and friends when the caller names none.
        config.region = info
            .region
            .clone()
            .or_else(|| Config::default().from_env(&ctx).region);
        let signer = AwsSigner::new(info.signature_version, &config)?;

        let uri: Uri = info.endpoint.parse().map_err(|e| {
            Error::config_invalid("invalid service endpoint")
                .with_source(e)
                .with_context(format!("endpoint: {}", info.endpoint))
        })?;
        let host = uri
            .authority()
            .ok_or_else(|| {
                Error::config_invalid("service endpoint has no host")
                    .with_context(format!("endpoint: {}", info.endpoint))
            })?
            .to_string();

        Ok(Self {
            signer: Signer::new(ctx, provider, signer),
            version: info.signature_version,
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTPS),
            host,
            base_path: uri.path().trim_end_matches('/').to_string(),
            attempts: AttemptStrategy::new(Duration::from_secs(5), Duration::from_millis(200)),
            retry: Arc::new(DefaultRetryPolicy),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy) -> Self {
        self.retry = Arc::new(policy);
        self
    }

    /// Replace the window within which retries may start.
    pub fn with_attempt_strategy(mut self, attempts: AttemptStrategy) -> Self {
        self.attempts = attempts;
        self
    }

    /// Send a signed request and return the response body.
    ///
    /// GET requests carry `params` in the URL, other methods send them as a
    /// form-encoded body.
    pub async fn query(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Bytes> {
        let mut attempt = self.attempts.start();
        let mut num_retries = 0;

        while attempt.next_async().await {
            let failure = match self.send_once(&method, path, params).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            let input = failure.retry_input();
            if self.retry.should_retry(&input, num_retries) && attempt.has_next() {
                num_retries += 1;
                let delay = self.retry.delay(num_retries);
                debug!("retrying {method} {path} in {delay:?} (retry {num_retries})");
                tokio::time::sleep(delay).await;
                continue;
            }
            return Err(failure.into_error());
        }

        Err(Error::unexpected("retry window closed before the request was sent"))
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        params: &[(String, String)],
    ) -> std::result::Result<Bytes, Failure> {
        let req = self.build_request(method, path, params)?;
        let req = self.sign_and_build(req).await?;

        let resp = self
            .signer
            .context()
            .http_send(req)
            .await
            .map_err(Failure::Other)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.into_body());
        }

        let err = ServiceError::from_response(status, resp.body());
        debug!("service responded with error: {err:?}");
        Err(Failure::Service(err))
    }

    fn build_request(
        &self,
        method: &Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<SigningRequest> {
        let path = format!("{}/{}", self.base_path, path.trim_start_matches('/'));
        let mut req = SigningRequest::new(method.clone(), &self.host, path);
        req.scheme = self.scheme.clone();
        req.params = params.to_vec();

        if self.version.uses_timestamp_param() && !req.has_param(TIMESTAMP_PARAM) {
            req.set_param(TIMESTAMP_PARAM, format_rfc3339(now()));
        }
        req.insert_header(HOST.as_str(), &self.host, false)?;
        req.insert_header(DATE.as_str(), &format_http_date(now()), false)?;
        if method != Method::GET {
            req.headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
            );
        }
        // V4 hashes the body, so the form must exist before signing.
        if method != Method::GET && self.version == SignatureVersion::V4 {
            move_params_to_body(&mut req);
        }
        Ok(req)
    }

    async fn sign_and_build(&self, mut req: SigningRequest) -> Result<http::Request<Bytes>> {
        self.signer.sign(&mut req).await?;
        if req.method != Method::GET && req.body.is_none() {
            move_params_to_body(&mut req);
        }

        let mut builder = http::Request::builder()
            .method(req.method.clone())
            .uri(req.uri()?);
        if let Some(headers) = builder.headers_mut() {
            *headers = req.headers;
        }
        Ok(builder.body(req.body.unwrap_or_default())?)
    }
}

fn move_params_to_body(req: &mut SigningRequest) {
    req.body = Some(Bytes::from(req.query_string()));
    req.params.clear();
}

/// Build the parameters of a query API call.
pub fn make_params(action: &str) -> Vec<(String, String)> {
    vec![("Action".to_string(), action.to_string())]
}

/// ServiceError is the error document returned by an AWS service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message} (status: {status}, request id: {request_id})")]
pub struct ServiceError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Fault type, `Sender` or `Receiver`, when the service reports one.
    pub error_type: String,
    /// Error code such as `Throttling`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id for support cases.
    pub request_id: String,
}

impl ServiceError {
    /// Decode the error document of a failed response.
    ///
    /// Query APIs (`<ErrorResponse>`), EC2 style (`<Response><Errors>`) and
    /// S3 style (`<Error>`) documents are understood. Anything else keeps the
    /// raw body as message.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let doc: ErrorDocument = de::from_str(&text).unwrap_or_default();

        let body = doc
            .error
            .or_else(|| doc.errors.and_then(|v| v.error.into_iter().next()))
            .unwrap_or(ErrorBody {
                error_type: doc.error_type,
                code: doc.code,
                message: doc.message,
            });
        let request_id = if doc.request_id.is_empty() {
            doc.request_id_upper
        } else {
            doc.request_id
        };

        let code = if body.code.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body.code
        };
        let message = if body.message.is_empty() {
            text.trim().to_string()
        } else {
            body.message
        };

        ServiceError {
            status,
            error_type: body.error_type,
            code,
            message,
            request_id,
        }
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorDocument {
    error: Option<ErrorBody>,
    errors: Option<ErrorList>,
    #[serde(rename = "Type")]
    error_type: String,
    code: String,
    message: String,
    request_id: String,
    #[serde(rename = "RequestID")]
    request_id_upper: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorList {
    error: Vec<ErrorBody>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(rename = "Type")]
    error_type: String,
    code: String,
    message: String,
}

/// Outcome of a failed attempt, kept apart until the retry decision is made.
enum Failure {
    Service(ServiceError),
    Other(Error),
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Failure::Other(err)
    }
}

impl Failure {
    fn retry_input(&self) -> RetryInput<'_> {
        match self {
            Failure::Service(err) => RetryInput {
                status: Some(err.status),
                error_code: Some(err.code.as_str()),
                transient: false,
            },
            Failure::Other(err) => RetryInput {
                status: None,
                error_code: None,
                transient: err.is_retryable(),
            },
        }
    }

    fn into_error(self) -> Error {
        match self {
            Failure::Service(err) => {
                Error::service_rejected(format!("{}: {}", err.code, err.message))
                    .with_context(format!("status: {}", err.status))
                    .with_context(format!("request_id: {}", err.request_id))
                    .set_retryable(err.status.is_server_error())
                    .with_source(err)
            }
            Failure::Other(err) => err,
        }
    }
}
