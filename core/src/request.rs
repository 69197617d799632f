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

use std::mem;
use std::str::FromStr;

use bytes::Bytes;
use http::header::HeaderName;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::utils::uri_encode;
use crate::{Error, Result};

/// SigningRequest describes one outgoing request in the shape signers need.
///
/// Query parameters are kept as an ordered list of decoded pairs so that
/// repeated keys survive; signers canonicalize them deterministically.
/// Header names are always lower-case (that's how [`HeaderMap`] stores
/// them) and a header may carry several values.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// Target host, with port if any.
    pub host: String,
    /// Request path, already URI-encoded.
    pub path: String,
    /// Decoded query parameters.
    pub params: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// Request body, hashed by some signers but never interpreted.
    pub body: Option<Bytes>,
}

impl SigningRequest {
    /// Create a request without parameters, headers or body.
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            scheme: Scheme::HTTPS,
            host: host.into(),
            path: path.into(),
            params: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Build a signing request from `http::request::Parts`.
    ///
    /// Headers are moved out of `parts`; hand them back with [`Self::apply`].
    pub fn from_parts(parts: &mut http::request::Parts) -> Result<Self> {
        // Check before taking the uri, a failure must leave `parts` intact.
        let authority = parts
            .uri
            .authority()
            .cloned()
            .ok_or_else(|| Error::request_invalid("request without authority can't be signed"))?;
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            host: authority.as_str().to_string(),
            path: paq.path().to_string(),
            params: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            headers: mem::take(&mut parts.headers),
            body: None,
        })
    }

    /// Write the signed request back into `http::request::Parts`.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        parts.uri = self.uri()?;
        parts.method = self.method;
        mem::swap(&mut parts.headers, &mut self.headers);
        Ok(())
    }

    /// Build the full request URI including the encoded query string.
    pub fn uri(&self) -> Result<Uri> {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        let query = self.query_string();
        let paq = if query.is_empty() {
            PathAndQuery::from_str(path)?
        } else {
            PathAndQuery::from_str(&format!("{path}?{query}"))?
        };

        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.host.as_str())
            .path_and_query(paq)
            .build()?)
    }

    /// Render the parameters as a query string in their current order.
    ///
    /// Keys and values are RFC 3986 encoded; an empty value renders as a
    /// bare key (`?acl`), which S3 sub-resources rely on.
    pub fn query_string(&self) -> String {
        let mut s = String::new();
        for (idx, (k, v)) in self.params.iter().enumerate() {
            if idx > 0 {
                s.push('&');
            }
            s.push_str(&uri_encode(k));
            if !v.is_empty() {
                s.push('=');
                s.push_str(&uri_encode(v));
            }
        }
        s
    }

    /// Get the first value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a query parameter is present.
    pub fn has_param(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Replace every value of `key` with a single `value`.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.params.retain(|(k, _)| *k != key);
        self.params.push((key, value.into()));
    }

    /// Append a query parameter, keeping existing values of the same key.
    pub fn push_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    /// Get the first value of a header as `&str`.
    ///
    /// Returns `Ok(None)` if the header is absent and an error if its value
    /// is not visible ASCII.
    pub fn header_str(&self, name: &str) -> Result<Option<&str>> {
        match self.headers.get(name) {
            Some(v) => Ok(Some(v.to_str()?)),
            None => Ok(None),
        }
    }

    /// Get every value of a header as `&str`, in insertion order.
    pub fn header_values(&self, name: &str) -> Result<Vec<&str>> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().map_err(Error::from))
            .collect()
    }

    /// Insert a header, replacing previous values.
    ///
    /// Sensitive values (signatures, tokens) are flagged so that `http`
    /// hides them from `Debug` output.
    pub fn insert_header(&mut self, name: &str, value: &str, sensitive: bool) -> Result<()> {
        let name = HeaderName::from_str(name)?;
        let mut value = HeaderValue::from_str(value)?;
        value.set_sensitive(sensitive);
        self.headers.insert(name, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_parts_and_apply() -> Result<()> {
        let req = http::Request::get("https://sqs.us-east-1.amazonaws.com/123/queue?Action=SendMessage&MessageBody=hello%20world")
            .header("x-amz-meta-a", "1")
            .body(())?;
        let (mut parts, _) = req.into_parts();

        let mut sreq = SigningRequest::from_parts(&mut parts)?;
        assert_eq!(sreq.host, "sqs.us-east-1.amazonaws.com");
        assert_eq!(sreq.path, "/123/queue");
        assert_eq!(sreq.param("MessageBody"), Some("hello world"));
        assert_eq!(sreq.header_str("x-amz-meta-a")?, Some("1"));
        assert!(parts.headers.is_empty());

        sreq.set_param("Signature", "a+b/c=");
        sreq.apply(&mut parts)?;

        assert_eq!(
            parts.uri.to_string(),
            "https://sqs.us-east-1.amazonaws.com/123/queue?Action=SendMessage&MessageBody=hello%20world&Signature=a%2Bb%2Fc%3D"
        );
        assert_eq!(parts.headers["x-amz-meta-a"], "1");
        Ok(())
    }

    #[test]
    fn test_from_parts_without_authority() {
        let req = http::Request::get("/relative").body(()).unwrap();
        let (mut parts, _) = req.into_parts();

        let err = SigningRequest::from_parts(&mut parts).unwrap_err();
        assert!(err.is_signing_error());
        assert_eq!(parts.uri, "/relative");
    }

    #[test]
    fn test_params() {
        let mut req = SigningRequest::new(Method::GET, "s3.amazonaws.com", "/bucket");
        req.push_param("acl", "");
        req.push_param("k", "1");
        req.push_param("k", "2");
        assert_eq!(req.query_string(), "acl&k=1&k=2");

        req.set_param("k", "3");
        assert_eq!(req.query_string(), "acl&k=3");
        assert!(req.has_param("acl"));
        assert!(!req.has_param("Expires"));
    }

    #[test]
    fn test_headers() -> Result<()> {
        let mut req = SigningRequest::new(Method::GET, "example.com", "/");
        req.headers.append("x-amz-meta-a", HeaderValue::from_static("b"));
        req.headers.append("x-amz-meta-a", HeaderValue::from_static("a"));
        req.insert_header("Authorization", "secret", true)?;

        assert_eq!(req.header_values("x-amz-meta-a")?, vec!["b", "a"]);
        assert!(req.headers["authorization"].is_sensitive());
        assert_eq!(req.header_str("date")?, None);
        Ok(())
    }
}
