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

use awsign_core::utils::Redact;
use awsign_core::Context;
use std::fmt::{Debug, Formatter};

use crate::constants::*;

/// Config for aws services.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ACCESS_KEY_ID`], then `AWS_ACCESS_KEY`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SECRET_ACCESS_KEY`], then `AWS_SECRET_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SESSION_TOKEN`]
    pub session_token: Option<String>,
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`], then `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// `ec2_metadata_endpoint` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_EC2_METADATA_SERVICE_ENDPOINT`]
    /// - default to `http://169.254.169.254`
    pub ec2_metadata_endpoint: Option<String>,
    /// `ec2_metadata_disabled` value will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_EC2_METADATA_DISABLED`]
    pub ec2_metadata_disabled: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("region", &self.region)
            .field("ec2_metadata_endpoint", &self.ec2_metadata_endpoint)
            .field("ec2_metadata_disabled", &self.ec2_metadata_disabled)
            .finish()
    }
}

impl Config {
    /// Fill every unset field from the environment exposed by `ctx`.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.access_key_id.is_none() {
            self.access_key_id = ctx.env_var_any(&[AWS_ACCESS_KEY_ID, AWS_ACCESS_KEY]);
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = ctx.env_var_any(&[AWS_SECRET_ACCESS_KEY, AWS_SECRET_KEY]);
        }
        if self.session_token.is_none() {
            self.session_token = ctx.env_var_any(&[AWS_SESSION_TOKEN]);
        }
        if self.region.is_none() {
            self.region = ctx.env_var_any(&[AWS_REGION, AWS_DEFAULT_REGION]);
        }
        if self.ec2_metadata_endpoint.is_none() {
            self.ec2_metadata_endpoint = ctx.env_var_any(&[AWS_EC2_METADATA_SERVICE_ENDPOINT]);
        }
        if let Some(v) = ctx.env_var(AWS_EC2_METADATA_DISABLED) {
            self.ec2_metadata_disabled |= v.eq_ignore_ascii_case("true");
        }

        self
    }
}
