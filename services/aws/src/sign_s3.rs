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

//! S3 flavoured Signature V2.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use awsign_core::hash::base64_hmac_sha1;
use awsign_core::{Result, SignRequest, SigningRequest};
use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use http::HeaderValue;
use log::debug;
use once_cell::sync::Lazy;

use crate::constants::*;
use crate::Credential;

/// Query parameters that are part of the signed resource.
static SUBRESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "delete",
        "location",
        "logging",
        "notification",
        "partNumber",
        "policy",
        "requestPayment",
        "response-cache-control",
        "response-content-disposition",
        "response-content-encoding",
        "response-content-language",
        "response-content-type",
        "response-expires",
        "torrent",
        "uploadId",
        "uploads",
        "versionId",
        "versioning",
        "versions",
        "website",
    ])
});

/// S3V2Signer implements the HMAC-SHA1 header signature of S3.
///
/// Requests carrying an `Expires` parameter are signed as pre-signed URLs:
/// the signature goes into the `Signature` parameter instead of the
/// `Authorization` header.
#[derive(Debug, Clone)]
pub struct S3V2Signer {
    subresources: HashSet<String>,
}

impl Default for S3V2Signer {
    fn default() -> Self {
        Self {
            subresources: SUBRESOURCES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl S3V2Signer {
    /// Create a signer with the standard S3 sub-resource list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list of query parameters included in the signature.
    pub fn with_subresources<I, S>(mut self, subresources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subresources = subresources.into_iter().map(Into::into).collect();
        self
    }

    fn string_to_sign(&self, req: &SigningRequest, cred: &Credential) -> Result<String> {
        let content_md5 = req.header_str(CONTENT_MD5)?.unwrap_or_default();
        let content_type = req.header_str(CONTENT_TYPE.as_str())?.unwrap_or_default();
        let mut date = req.header_str(DATE.as_str())?.unwrap_or_default();

        let mut amz_headers = BTreeMap::new();
        for name in req.headers.keys() {
            let name = name.as_str();
            if name.starts_with(X_AMZ_PREFIX) {
                amz_headers.insert(name.to_string(), req.header_values(name)?.join(","));
            }
        }
        if let Some(token) = cred.token() {
            amz_headers.insert(X_AMZ_SECURITY_TOKEN.to_string(), token.to_string());
        }
        if amz_headers.contains_key(X_AMZ_DATE) {
            date = "";
        }
        if let Some(expires) = req.param(EXPIRES_PARAM) {
            date = expires;
        }

        let mut s = String::new();
        writeln!(s, "{}", req.method)?;
        writeln!(s, "{content_md5}")?;
        writeln!(s, "{content_type}")?;
        writeln!(s, "{date}")?;
        for (k, v) in amz_headers {
            writeln!(s, "{k}:{v}")?;
        }
        s.push_str(&self.canonical_resource(req));
        Ok(s)
    }

    fn canonical_resource(&self, req: &SigningRequest) -> String {
        let mut params: Vec<_> = req
            .params
            .iter()
            .filter(|(k, _)| self.subresources.contains(k.as_str()))
            .collect();
        params.sort();

        let mut s = if req.path.is_empty() {
            "/".to_string()
        } else {
            req.path.clone()
        };
        for (idx, (k, v)) in params.into_iter().enumerate() {
            s.push(if idx == 0 { '?' } else { '&' });
            s.push_str(k);
            if !v.is_empty() {
                s.push('=');
                s.push_str(v);
            }
        }
        s
    }
}

impl SignRequest for S3V2Signer {
    type Credential = Credential;

    fn sign_request(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        let string_to_sign = self.string_to_sign(req, cred)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signature = base64_hmac_sha1(
            cred.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        );

        if req.has_param(EXPIRES_PARAM) {
            req.set_param(AWS_ACCESS_KEY_ID_PARAM, cred.access_key_id.as_str());
            req.set_param(SIGNATURE_PARAM, signature);
            if let Some(token) = cred.token() {
                req.set_param(X_AMZ_SECURITY_TOKEN, token);
            }
            return Ok(());
        }

        // Build every header value first so that a bad one leaves the request untouched.
        let mut authorization =
            HeaderValue::from_str(&format!("AWS {}:{signature}", cred.access_key_id))?;
        authorization.set_sensitive(true);
        let token = match cred.token() {
            Some(token) => {
                let mut v = HeaderValue::from_str(token)?;
                v.set_sensitive(true);
                Some(v)
            }
            None => None,
        };

        req.headers.insert(AUTHORIZATION, authorization);
        if let Some(token) = token {
            req.headers.insert(X_AMZ_SECURITY_TOKEN, token);
        }
        Ok(())
    }
}
