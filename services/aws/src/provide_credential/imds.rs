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

use crate::constants::*;
use crate::{Config, Credential};
use async_trait::async_trait;
use awsign_core::time::{now, parse_rfc3339, DateTime};
use awsign_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Method, StatusCode};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

const TOKEN_TTL_SECONDS: i64 = 21600;

/// ImdsCredentialProvider loads the role credential of an EC2 instance from
/// the instance metadata service (IMDSv2).
///
/// The flow is: fetch a session token with `PUT /latest/api/token`, list
/// the attached role under `iam/security-credentials/`, then fetch that
/// role's JSON document.
#[derive(Debug, Clone)]
pub struct ImdsCredentialProvider {
    endpoint: Option<String>,
    disabled: bool,
    token: Arc<Mutex<(String, DateTime)>>,
}

impl Default for ImdsCredentialProvider {
    fn default() -> Self {
        Self {
            endpoint: None,
            disabled: false,
            token: Arc::new(Mutex::new((String::new(), DateTime::default()))),
        }
    }
}

impl ImdsCredentialProvider {
    /// Create a new `ImdsCredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the metadata settings in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.ec2_metadata_endpoint.clone(),
            disabled: config.ec2_metadata_disabled,
            ..Self::default()
        }
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint(&self, ctx: &Context) -> String {
        let endpoint = self.endpoint.clone().unwrap_or_else(|| {
            ctx.env_var_any(&[AWS_EC2_METADATA_SERVICE_ENDPOINT])
                .unwrap_or_else(|| DEFAULT_EC2_METADATA_ENDPOINT.to_string())
        });
        endpoint.trim_end_matches('/').to_string()
    }

    fn is_disabled(&self, ctx: &Context) -> bool {
        self.disabled
            || ctx
                .env_var(AWS_EC2_METADATA_DISABLED)
                .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    async fn load_token(&self, ctx: &Context, endpoint: &str) -> Result<String> {
        {
            let (token, expires_in) = self.token.lock().expect("lock poisoned").clone();
            if expires_in > now() {
                return Ok(token);
            }
        }

        let url = format!("{endpoint}/latest/api/token");
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            .header(
                "x-aws-ec2-metadata-token-ttl-seconds",
                TOKEN_TTL_SECONDS.to_string(),
            )
            .body(Bytes::new())?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::unexpected("failed to connect to instance metadata service")
                .with_source(e)
                .with_context(format!("endpoint: {endpoint}"))
                .set_retryable(true)
        })?;
        if resp.status() != StatusCode::OK {
            return Err(imds_error("fetch_token", resp.status(), resp.body()));
        }

        let token = resp.into_body();
        // Re-read ten minutes before the token really expires.
        let expires_in = now() + chrono::TimeDelta::seconds(TOKEN_TTL_SECONDS - 600);
        *self.token.lock().expect("lock poisoned") = (token.clone(), expires_in);

        Ok(token)
    }

    /// Region of the instance, read from its availability zone.
    pub async fn region(&self, ctx: &Context) -> Result<String> {
        if self.is_disabled(ctx) {
            return Err(Error::config_invalid("instance metadata service is disabled"));
        }

        let endpoint = self.endpoint(ctx);
        let token = self.load_token(ctx, &endpoint).await?;
        let url = format!("{endpoint}/latest/meta-data/placement/availability-zone");
        let zone = self.get(ctx, &url, &token, "fetch_region").await?;

        // The zone is the region plus one trailing letter, e.g. `us-west-2b`.
        let zone = zone.trim();
        match zone.strip_suffix(|c: char| c.is_ascii_lowercase()) {
            Some(region) if region.ends_with(|c: char| c.is_ascii_digit()) => {
                Ok(region.to_string())
            }
            _ => Err(Error::unexpected("invalid availability zone")
                .with_context(format!("zone: {zone}"))),
        }
    }

    async fn get(&self, ctx: &Context, url: &str, token: &str, op: &str) -> Result<String> {
        let req = http::Request::builder()
            .uri(url)
            .method(Method::GET)
            .header("x-aws-ec2-metadata-token", token)
            .body(Bytes::new())?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::unexpected("failed to query instance metadata service")
                .with_source(e)
                .with_context(format!("operation: {op}"))
                .set_retryable(true)
        })?;
        if resp.status() != StatusCode::OK {
            return Err(imds_error(op, resp.status(), resp.body()));
        }
        Ok(resp.into_body())
    }
}

#[async_trait]
impl ProvideCredential for ImdsCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if self.is_disabled(ctx) {
            log::debug!("instance metadata service is disabled");
            return Ok(None);
        }

        let endpoint = self.endpoint(ctx);
        let token = self.load_token(ctx, &endpoint).await?;

        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/");
        let roles = self.get(ctx, &url, &token, "list_roles").await?;
        // Only one role can be attached to an instance profile.
        let Some(role) = roles.lines().map(str::trim).find(|v| !v.is_empty()) else {
            return Err(Error::config_invalid("no IAM role attached to EC2 instance")
                .with_context("hint: attach an IAM role to your EC2 instance"));
        };

        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/{role}");
        let content = self.get(ctx, &url, &token, "fetch_credentials").await?;
        let resp: RoleCredentials = serde_json::from_str(&content).map_err(|e| {
            Error::unexpected("failed to parse instance metadata credentials")
                .with_source(e)
                .with_context(format!("role: {role}"))
        })?;

        match resp.code.as_str() {
            "" | "Success" => {}
            "AssumeRoleUnauthorizedAccess" => {
                return Err(Error::credential_denied(format!(
                    "EC2 instance not authorized to assume role: {}",
                    resp.message
                ))
                .with_context(format!("role: {role}")));
            }
            code => {
                return Err(Error::unexpected(format!(
                    "instance metadata service returned error: [{code}] {}",
                    resp.message
                ))
                .with_context(format!("role: {role}")));
            }
        }

        let expires_in = if resp.expiration.is_empty() {
            None
        } else {
            Some(parse_rfc3339(&resp.expiration)?)
        };

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token).filter(|v| !v.is_empty()),
            expires_in,
        }))
    }
}

fn imds_error(op: &str, status: StatusCode, body: &str) -> Error {
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::credential_denied(format!("instance metadata service denied {op}"))
        }
        StatusCode::NOT_FOUND => {
            Error::config_invalid(format!("instance metadata service has nothing for {op}"))
        }
        s => Error::unexpected(format!("instance metadata service failed {op}"))
            .set_retryable(s.is_server_error()),
    };
    err.with_context(format!("status: {status}"))
        .with_context(format!("body: {body}"))
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsign_core::{ErrorKind, HttpSend, StaticEnv};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, Clone)]
    struct MockImds {
        token_calls: Arc<AtomicUsize>,
        zone: String,
    }

    #[async_trait]
    impl HttpSend for MockImds {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let path = req.uri().path().to_string();
            let (status, body) = match (req.method().clone(), path.as_str()) {
                (Method::PUT, "/latest/api/token") => {
                    self.token_calls.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::OK, "imds-token".to_string())
                }
                (Method::GET, _) if req.headers()["x-aws-ec2-metadata-token"] != "imds-token" => {
                    (StatusCode::UNAUTHORIZED, String::new())
                }
                (Method::GET, "/latest/meta-data/placement/availability-zone") => {
                    (StatusCode::OK, self.zone.clone())
                }
                (Method::GET, "/latest/meta-data/iam/security-credentials/") => {
                    (StatusCode::OK, "web-role\n".to_string())
                }
                (Method::GET, "/latest/meta-data/iam/security-credentials/web-role") => (
                    StatusCode::OK,
                    r#"{
                        "Code": "Success",
                        "LastUpdated": "2012-04-26T16:39:16Z",
                        "Type": "AWS-HMAC",
                        "AccessKeyId": "ASIAEXAMPLE",
                        "SecretAccessKey": "imds-secret",
                        "Token": "imds-session",
                        "Expiration": "2099-05-17T15:09:54Z"
                    }"#
                    .to_string(),
                ),
                _ => (StatusCode::NOT_FOUND, String::new()),
            };

            Ok(http::Response::builder()
                .status(status)
                .body(Bytes::from(body))?)
        }
    }

    #[tokio::test]
    async fn test_imds_credential_provider() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let imds = MockImds::default();
        let ctx = Context::new().with_http_send(imds.clone());
        let provider = ImdsCredentialProvider::new().with_endpoint("http://127.0.0.1:1338/");

        let cred = provider
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key_id, "ASIAEXAMPLE");
        assert_eq!(cred.secret_access_key, "imds-secret");
        assert_eq!(cred.session_token.as_deref(), Some("imds-session"));
        assert_eq!(
            cred.expires_in,
            Some(parse_rfc3339("2099-05-17T15:09:54Z")?)
        );

        // The session token is reused.
        provider.provide_credential(&ctx).await?;
        assert_eq!(imds.token_calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_imds_disabled() -> Result<()> {
        let ctx = Context::new()
            .with_http_send(MockImds::default())
            .with_env(StaticEnv::from_pairs([(AWS_EC2_METADATA_DISABLED, "true")]));

        let cred = ImdsCredentialProvider::new().provide_credential(&ctx).await?;
        assert!(cred.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_imds_unreachable_is_retryable() {
        let ctx = Context::new();

        let err = ImdsCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_imds_region() -> Result<()> {
        let imds = MockImds {
            zone: "us-west-2b\n".to_string(),
            ..Default::default()
        };
        let ctx = Context::new().with_http_send(imds.clone());
        let provider = ImdsCredentialProvider::new();

        assert_eq!(provider.region(&ctx).await?, "us-west-2");
        // Shares the session token with credential loading.
        provider.provide_credential(&ctx).await?;
        assert_eq!(imds.token_calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_imds_region_rejects_garbage() {
        let ctx = Context::new().with_http_send(MockImds {
            zone: "<html>".to_string(),
            ..Default::default()
        });

        let err = ImdsCredentialProvider::new().region(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[tokio::test]
    async fn test_imds_region_disabled() {
        let ctx = Context::new()
            .with_http_send(MockImds::default())
            .with_env(StaticEnv::from_pairs([(AWS_EC2_METADATA_DISABLED, "true")]));

        let err = ImdsCredentialProvider::new().region(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
