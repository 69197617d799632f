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

//! Signature Version 2 for query APIs.

use std::fmt::Write;

use awsign_core::hash::{base64_hmac_sha1, base64_hmac_sha256};
use awsign_core::utils::uri_encode;
use awsign_core::{Error, Result, SignRequest, SigningRequest};
use log::debug;

use crate::constants::*;
use crate::Credential;

/// QueryV2Signer signs query API requests (CloudWatch, SQS, SNS, IAM, RDS,
/// ElastiCache, Auto Scaling, STS, SES) with HmacSHA256.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryV2Signer;

impl QueryV2Signer {
    /// Create a new query signer.
    pub fn new() -> Self {
        Self
    }
}

impl SignRequest for QueryV2Signer {
    type Credential = Credential;

    fn sign_request(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        let mut params = req.params.clone();
        set_param(&mut params, AWS_ACCESS_KEY_ID_PARAM, &cred.access_key_id);
        set_param(&mut params, SIGNATURE_VERSION_PARAM, "2");
        set_param(&mut params, SIGNATURE_METHOD_PARAM, "HmacSHA256");
        if let Some(token) = cred.token() {
            set_param(&mut params, SECURITY_TOKEN_PARAM, token);
        }
        params.retain(|(k, _)| k != SIGNATURE_PARAM);
        params.sort();

        let path = if req.path.is_empty() { "/" } else { &req.path };
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            req.method,
            req.host.to_ascii_lowercase(),
            path,
            canonical_query(&params)
        );
        debug!("calculated string to sign: {string_to_sign}");

        let signature = base64_hmac_sha256(
            cred.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        );
        params.push((SIGNATURE_PARAM.to_string(), signature));
        req.params = params;
        Ok(())
    }
}

/// OperationV2Signer signs requests of services that sign only the
/// operation name and timestamp, such as Mechanical Turk.
///
/// `Operation` and `Timestamp` must already be present in the parameters.
#[derive(Debug, Clone)]
pub struct OperationV2Signer {
    service: String,
}

impl OperationV2Signer {
    /// Create a signer for `service`, e.g. `AWSMechanicalTurkRequester`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl SignRequest for OperationV2Signer {
    type Credential = Credential;

    fn sign_request(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        let operation = req
            .param("Operation")
            .ok_or_else(|| Error::request_invalid("missing Operation parameter"))?;
        let timestamp = req
            .param(TIMESTAMP_PARAM)
            .ok_or_else(|| Error::request_invalid("missing Timestamp parameter"))?;

        let signature = operation_signature(
            &cred.secret_access_key,
            &self.service,
            operation,
            timestamp,
        );
        req.set_param("Service", self.service.as_str());
        req.set_param(AWS_ACCESS_KEY_ID_PARAM, cred.access_key_id.as_str());
        req.set_param(SIGNATURE_PARAM, signature);
        Ok(())
    }
}

/// Compute `base64(HMAC-SHA1(secret, service + operation + timestamp))`.
pub fn operation_signature(
    secret: &str,
    service: &str,
    operation: &str,
    timestamp: &str,
) -> String {
    let payload = format!("{service}{operation}{timestamp}");
    base64_hmac_sha1(secret.as_bytes(), payload.as_bytes())
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    params.retain(|(k, _)| k != key);
    params.push((key.to_string(), value.to_string()));
}

/// Join sorted params as `k=v` pairs with both sides RFC 3986 encoded.
fn canonical_query(params: &[(String, String)]) -> String {
    let mut s = String::new();
    for (idx, (k, v)) in params.iter().enumerate() {
        if idx > 0 {
            s.push('&');
        }
        // Writing into a String never fails.
        let _ = write!(s, "{}={}", uri_encode(k), uri_encode(v));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use pretty_assertions::assert_eq;

    fn list_metrics() -> SigningRequest {
        let mut req = SigningRequest::new(Method::GET, "monitoring.us-east-1.amazonaws.com", "");
        req.push_param("Action", "ListMetrics");
        req.push_param("Timestamp", "2012-02-16T20:30:47Z");
        req.push_param("Namespace", "AWS/EC2");
        req
    }

    #[test]
    fn test_query_v2() -> Result<()> {
        let mut req = list_metrics();
        QueryV2Signer.sign_request(&mut req, &Credential::new("user", "secret"))?;

        assert_eq!(
            req.param(SIGNATURE_PARAM),
            Some("P3HAuatNd0rgdZ+nzFbJ9vo3Ik8OiU7WPQLILd0wUU0=")
        );
        assert_eq!(req.param(AWS_ACCESS_KEY_ID_PARAM), Some("user"));
        assert_eq!(req.param(SIGNATURE_METHOD_PARAM), Some("HmacSHA256"));
        assert!(!req.has_param(SECURITY_TOKEN_PARAM));
        Ok(())
    }

    #[test]
    fn test_query_v2_host_is_case_insensitive() -> Result<()> {
        let mut req = list_metrics();
        req.host = "Monitoring.US-East-1.amazonaws.com".to_string();
        QueryV2Signer.sign_request(&mut req, &Credential::new("user", "secret"))?;

        assert_eq!(
            req.param(SIGNATURE_PARAM),
            Some("P3HAuatNd0rgdZ+nzFbJ9vo3Ik8OiU7WPQLILd0wUU0=")
        );
        Ok(())
    }

    #[test]
    fn test_query_v2_with_token() -> Result<()> {
        let mut req = list_metrics();
        let cred = Credential::new("user", "secret").with_session_token("tok");
        QueryV2Signer.sign_request(&mut req, &cred)?;

        assert_eq!(req.param(SECURITY_TOKEN_PARAM), Some("tok"));
        assert_eq!(
            req.param(SIGNATURE_PARAM),
            Some("0gF0tqo1YjNrZYswB/qsMxi232s6E/uz5z60oiUnreY=")
        );
        Ok(())
    }

    #[test]
    fn test_query_v2_is_deterministic() -> Result<()> {
        let cred = Credential::new("user", "secret");
        let mut first = list_metrics();
        QueryV2Signer.sign_request(&mut first, &cred)?;

        // Re-signing replaces the previous signature instead of adding one.
        let mut second = first.clone();
        QueryV2Signer.sign_request(&mut second, &cred)?;
        assert_eq!(first.query_string(), second.query_string());
        Ok(())
    }

    #[test]
    fn test_operation_signature() {
        assert_eq!(
            operation_signature(
                "secret",
                "AWSMechanicalTurkRequester",
                "CreateHIT",
                "2012-02-16T20:30:47Z"
            ),
            "b/TnvzrdeD/L/EyzdFrznPXhido="
        );
    }

    #[test]
    fn test_operation_v2() -> Result<()> {
        let mut req = SigningRequest::new(Method::GET, "mechanicalturk.amazonaws.com", "/");
        req.push_param("Operation", "CreateHIT");
        req.push_param("Timestamp", "2012-02-16T20:30:47Z");

        OperationV2Signer::new("AWSMechanicalTurkRequester")
            .sign_request(&mut req, &Credential::new("user", "secret"))?;
        assert_eq!(req.param("Service"), Some("AWSMechanicalTurkRequester"));
        assert_eq!(req.param(AWS_ACCESS_KEY_ID_PARAM), Some("user"));
        assert_eq!(req.param(SIGNATURE_PARAM), Some("b/TnvzrdeD/L/EyzdFrznPXhido="));
        Ok(())
    }

    #[test]
    fn test_operation_v2_missing_timestamp() {
        let mut req = SigningRequest::new(Method::GET, "mechanicalturk.amazonaws.com", "/");
        req.push_param("Operation", "CreateHIT");
        let before = req.params.clone();

        let err = OperationV2Signer::new("AWSMechanicalTurkRequester")
            .sign_request(&mut req, &Credential::new("user", "secret"))
            .unwrap_err();
        assert!(err.is_signing_error());
        assert_eq!(req.params, before);
    }
}
