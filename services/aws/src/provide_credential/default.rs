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

use crate::provide_credential::{
    EnvCredentialProvider, ImdsCredentialProvider, ProvideCredentialChain,
    StaticCredentialProvider,
};
use crate::{Config, Credential};
use async_trait::async_trait;
use awsign_core::{Context, ProvideCredential, Result};

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Keys set explicitly in [`Config`]
/// 2. Environment variables
/// 3. EC2 instance metadata (IMDSv2)
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create a chain honouring the keys and metadata settings in `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut chain = ProvideCredentialChain::new();
        if let Some(p) = StaticCredentialProvider::from_config(config) {
            chain = chain.push(p);
        }
        let chain = chain
            .push(EnvCredentialProvider::new())
            .push(ImdsCredentialProvider::from_config(config));

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY};
    use awsign_core::StaticEnv;

    #[tokio::test]
    async fn test_default_loader_without_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        // No HTTP client, so the metadata lookup fails and is skipped.
        let ctx = Context::new().with_env(StaticEnv::default());

        let l = DefaultCredentialProvider::new();
        let x = l.provide_credential(&ctx).await.expect("load must succeed");
        assert!(x.is_none());
    }

    #[tokio::test]
    async fn test_default_loader_with_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_env(StaticEnv::from_pairs([
            (AWS_ACCESS_KEY_ID, "access_key_id"),
            (AWS_SECRET_ACCESS_KEY, "secret_access_key"),
        ]));

        let l = DefaultCredentialProvider::new();
        let x = l
            .provide_credential(&ctx)
            .await
            .expect("load must succeed")
            .expect("must load succeed");
        assert_eq!("access_key_id", x.access_key_id);
        assert_eq!("secret_access_key", x.secret_access_key);
    }

    #[tokio::test]
    async fn test_default_loader_prefers_config() {
        let ctx = Context::new().with_env(StaticEnv::from_pairs([
            (AWS_ACCESS_KEY_ID, "env_access_key_id"),
            (AWS_SECRET_ACCESS_KEY, "env_secret_access_key"),
        ]));
        let cfg = Config {
            access_key_id: Some("cfg_access_key_id".to_string()),
            secret_access_key: Some("cfg_secret_access_key".to_string()),
            ..Default::default()
        };

        let l = DefaultCredentialProvider::from_config(&cfg);
        let x = l
            .provide_credential(&ctx)
            .await
            .expect("load must succeed")
            .expect("must load succeed");
        assert_eq!("cfg_access_key_id", x.access_key_id);
    }
}
