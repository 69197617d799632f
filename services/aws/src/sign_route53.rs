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

use awsign_core::hash::base64_hmac_sha256;
use awsign_core::{Error, Result, SignRequest, SigningRequest};
use http::header::DATE;
use http::HeaderValue;
use log::debug;

use crate::constants::*;
use crate::Credential;

/// Route53Signer signs the `Date` header with the raw secret key (AWS3-HTTPS).
#[derive(Debug, Default, Clone, Copy)]
pub struct Route53Signer;

impl Route53Signer {
    /// Create a new Route53 signer.
    pub fn new() -> Self {
        Self
    }
}

impl SignRequest for Route53Signer {
    type Credential = Credential;

    fn sign_request(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        let date = req
            .header_str(DATE.as_str())?
            .ok_or_else(|| Error::request_invalid("missing Date header"))?;
        debug!("calculated string to sign: {date}");

        let signature = base64_hmac_sha256(cred.secret_access_key.as_bytes(), date.as_bytes());
        let mut authorization = HeaderValue::from_str(&format!(
            "AWS3-HTTPS AWSAccessKeyId={},Algorithm=HmacSHA256,Signature={signature}",
            cred.access_key_id
        ))?;
        authorization.set_sensitive(true);
        let date = HeaderValue::from_str(date)?;
        let token = match cred.token() {
            Some(token) => {
                let mut v = HeaderValue::from_str(token)?;
                v.set_sensitive(true);
                Some(v)
            }
            None => None,
        };

        req.headers.insert(X_AMZN_AUTHORIZATION, authorization);
        req.headers.insert(X_AMZ_DATE, date);
        if let Some(token) = token {
            req.headers.insert(X_AMZ_SECURITY_TOKEN, token);
        }
        Ok(())
    }
}
