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

use std::collections::BTreeMap;
use std::fmt::Write;

use awsign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awsign_core::time::{format_date, format_iso8601, parse_http_date, DateTime};
use awsign_core::utils::uri_encode;
use awsign_core::{Error, Result, SignRequest, SigningRequest};
use http::header::{AUTHORIZATION, DATE};
use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::constants::*;
use crate::Credential;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// V4Signer implements AWS Signature Version 4 in its header form.
///
/// The request must carry a `Date` header in HTTP-date format; its value is
/// the signing time. Every header present on the request is signed, so the
/// caller is responsible for setting `host`.
#[derive(Debug, Clone)]
pub struct V4Signer {
    service: String,
    region: String,
}

impl V4Signer {
    /// Create a signer for `service` in `region`.
    pub fn new(service: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
        }
    }

    fn scope(&self, time: DateTime) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            format_date(time),
            self.region,
            self.service
        )
    }
}

impl SignRequest for V4Signer {
    type Credential = Credential;

    fn sign_request(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        let date = req
            .header_str(DATE.as_str())?
            .ok_or_else(|| Error::request_invalid("missing Date header"))?;
        let time = parse_http_date(date)?;

        // Work on a copy so that a failure leaves the request untouched.
        let mut headers = req.headers.clone();
        headers.remove(AUTHORIZATION);
        if let Some(token) = cred.token() {
            let mut v = HeaderValue::from_str(token)?;
            v.set_sensitive(true);
            headers.insert(X_AMZ_SECURITY_TOKEN, v);
        }

        let (creq, signed_headers) = canonical_request(req, &headers)?;
        debug!("calculated canonical request: {creq}");

        let scope = self.scope(time);
        let string_to_sign = format!(
            "{ALGORITHM}\n{}\n{scope}\n{}",
            format_iso8601(time),
            hex_sha256(creq.as_bytes())
        );
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = derive_signing_key(
            &cred.secret_access_key,
            time,
            &self.region,
            &self.service,
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            cred.access_key_id
        ))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        req.headers = headers;
        Ok(())
    }
}

/// Derive the V4 signing key for `time`, `region` and `service`.
///
/// The key is an HMAC-SHA256 chain starting from `AWS4<secret>` over the
/// date (`YYYYMMDD`), the region, the service and `aws4_request`.
pub fn derive_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    let key = hmac_sha256(
        format!("AWS4{secret}").as_bytes(),
        format_date(time).as_bytes(),
    );
    let key = hmac_sha256(&key, region.as_bytes());
    let key = hmac_sha256(&key, service.as_bytes());
    hmac_sha256(&key, b"aws4_request")
}

/// Build the canonical request, returning it with the signed header list.
fn canonical_request(req: &SigningRequest, headers: &HeaderMap) -> Result<(String, String)> {
    let mut f = String::new();

    writeln!(f, "{}", req.method)?;
    writeln!(f, "{}", clean_path(&req.path))?;

    let mut params: Vec<_> = req
        .params
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    params.sort();
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    writeln!(f, "{query}")?;

    let mut canonical_headers = BTreeMap::new();
    for name in headers.keys() {
        let mut values = headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().map(str::trim))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        values.sort_unstable();
        canonical_headers.insert(name.as_str(), values.join(","));
    }
    for (name, values) in &canonical_headers {
        writeln!(f, "{name}:{values}")?;
    }
    writeln!(f)?;

    let signed_headers = canonical_headers
        .keys()
        .copied()
        .collect::<Vec<_>>()
        .join(";");
    writeln!(f, "{signed_headers}")?;

    let payload_hash = hex_sha256(req.body.as_deref().unwrap_or_default());
    f.push_str(&payload_hash);

    Ok((f, signed_headers))
}

/// Normalize `path` the way a filesystem path-clean does.
///
/// `.` and `..` segments and duplicate slashes are removed. A trailing slash
/// survives unless the result is the root.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            seg => segments.push(seg),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for seg in &segments {
        cleaned.push('/');
        cleaned.push_str(seg);
    }
    if cleaned.is_empty() {
        return "/".to_string();
    }
    if path.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}
