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

use std::fmt;
use std::str::FromStr;

use awsign_core::{Error, Result, SignRequest, SigningRequest};

use crate::{
    Credential, OperationV2Signer, QueryV2Signer, Route53Signer, S3V2Signer, V4Signer,
};

/// The signing algorithm a service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVersion {
    /// Signature V2 over the full query (`v2`).
    V2,
    /// Signature V2 over service, operation and timestamp (`operation`).
    OperationV2,
    /// S3 flavoured Signature V2 (`s3`).
    S3,
    /// Signature V4 (`v4`).
    V4,
    /// Route53 AWS3-HTTPS (`route53`).
    Route53,
}

impl SignatureVersion {
    /// Whether this version signs a `Timestamp` query parameter.
    pub fn uses_timestamp_param(&self) -> bool {
        matches!(self, SignatureVersion::V2 | SignatureVersion::OperationV2)
    }

    fn as_str(&self) -> &'static str {
        match self {
            SignatureVersion::V2 => "v2",
            SignatureVersion::OperationV2 => "operation",
            SignatureVersion::S3 => "s3",
            SignatureVersion::V4 => "v4",
            SignatureVersion::Route53 => "route53",
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v2" | "2" => Ok(SignatureVersion::V2),
            "operation" => Ok(SignatureVersion::OperationV2),
            "s3" => Ok(SignatureVersion::S3),
            "v4" | "4" => Ok(SignatureVersion::V4),
            "route53" => Ok(SignatureVersion::Route53),
            _ => Err(Error::config_invalid(format!(
                "unsupported signature version: {s}"
            ))),
        }
    }
}

/// Per-service parameters of a signer.
#[derive(Debug, Clone, Default)]
pub struct SigningConfig {
    /// Service name, e.g. `dynamodb` for V4 or `AWSMechanicalTurkRequester`
    /// for operation signing.
    pub service: String,
    /// Region name, required by V4.
    pub region: Option<String>,
    /// Query parameters included in an S3 signature. `None` keeps the
    /// standard sub-resource list.
    pub signed_params: Option<Vec<String>>,
}

impl SigningConfig {
    /// Create a config for `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Default::default()
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the signed S3 sub-resources.
    pub fn with_signed_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signed_params = Some(params.into_iter().map(Into::into).collect());
        self
    }
}

/// AwsSigner dispatches to one of the signing algorithms.
#[derive(Debug, Clone)]
pub enum AwsSigner {
    /// See [`QueryV2Signer`].
    QueryV2(QueryV2Signer),
    /// See [`OperationV2Signer`].
    OperationV2(OperationV2Signer),
    /// See [`S3V2Signer`].
    S3(S3V2Signer),
    /// See [`V4Signer`].
    V4(V4Signer),
    /// See [`Route53Signer`].
    Route53(Route53Signer),
}

impl AwsSigner {
    /// Build the signer for `version` configured by `config`.
    pub fn new(version: SignatureVersion, config: &SigningConfig) -> Result<Self> {
        let signer = match version {
            SignatureVersion::V2 => AwsSigner::QueryV2(QueryV2Signer::new()),
            SignatureVersion::OperationV2 => {
                if config.service.is_empty() {
                    return Err(Error::config_invalid(
                        "operation signing requires a service name",
                    ));
                }
                AwsSigner::OperationV2(OperationV2Signer::new(&config.service))
            }
            SignatureVersion::S3 => {
                let signer = match &config.signed_params {
                    Some(params) => S3V2Signer::new().with_subresources(params.iter().cloned()),
                    None => S3V2Signer::new(),
                };
                AwsSigner::S3(signer)
            }
            SignatureVersion::V4 => {
                let region = config
                    .region
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| Error::config_invalid("signature v4 requires a region"))?;
                if config.service.is_empty() {
                    return Err(Error::config_invalid(
                        "signature v4 requires a service name",
                    ));
                }
                AwsSigner::V4(V4Signer::new(&config.service, region))
            }
            SignatureVersion::Route53 => AwsSigner::Route53(Route53Signer::new()),
        };
        Ok(signer)
    }

    /// The version implemented by this signer.
    pub fn version(&self) -> SignatureVersion {
        match self {
            AwsSigner::QueryV2(_) => SignatureVersion::V2,
            AwsSigner::OperationV2(_) => SignatureVersion::OperationV2,
            AwsSigner::S3(_) => SignatureVersion::S3,
            AwsSigner::V4(_) => SignatureVersion::V4,
            AwsSigner::Route53(_) => SignatureVersion::Route53,
        }
    }
}

impl SignRequest for AwsSigner {
    type Credential = Credential;

    fn sign_request(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        match self {
            AwsSigner::QueryV2(s) => s.sign_request(req, cred),
            AwsSigner::OperationV2(s) => s.sign_request(req, cred),
            AwsSigner::S3(s) => s.sign_request(req, cred),
            AwsSigner::V4(s) => s.sign_request(req, cred),
            AwsSigner::Route53(s) => s.sign_request(req, cred),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsign_core::ErrorKind;
    use test_case::test_case;

    #[test_case("v2" => SignatureVersion::V2)]
    #[test_case("V4" => SignatureVersion::V4)]
    #[test_case("s3" => SignatureVersion::S3)]
    #[test_case("route53" => SignatureVersion::Route53)]
    #[test_case("operation" => SignatureVersion::OperationV2)]
    fn test_parse_version(s: &str) -> SignatureVersion {
        s.parse().expect("must be a known version")
    }

    #[test]
    fn test_parse_unknown_version() {
        let err = "v3".parse::<SignatureVersion>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_v4_requires_region() {
        let err = AwsSigner::new(SignatureVersion::V4, &SigningConfig::new("dynamodb"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let signer = AwsSigner::new(
            SignatureVersion::V4,
            &SigningConfig::new("dynamodb").with_region("us-east-1"),
        )
        .expect("v4 with region must build");
        assert_eq!(signer.version(), SignatureVersion::V4);
    }
}
