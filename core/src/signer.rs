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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use crate::SigningRequest;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Signer ties a credential provider to a request signer.
///
/// The last loaded credential is cached and reused while it stays valid.
/// Refreshing happens under an async mutex: when several tasks find the
/// cached credential expired at the same time, only the first one calls
/// the provider and the others reuse its result.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    signer: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        signer: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            signer: Arc::new(signer),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context this signer loads credentials with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve a valid credential, loading a fresh one if the cached one is
    /// missing or expired.
    pub async fn credential(&self) -> Result<K> {
        let mut cached = self.credential.lock().await;
        if let Some(cred) = cached.as_ref().filter(|c| c.is_valid()) {
            return Ok(cred.clone());
        }

        log::debug!("cached credential missing or expired, loading a new one");
        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| {
                Error::credential_invalid("no valid credential found")
                    .with_context(format!("provider: {:?}", self.provider))
            })?;
        *cached = Some(cred.clone());
        Ok(cred)
    }

    /// Sign the request with a valid credential.
    pub async fn sign(&self, req: &mut SigningRequest) -> Result<()> {
        let cred = self.credential().await?;
        self.signer.sign_request(req, &cred)
    }

    /// Sign `http::request::Parts` in place.
    ///
    /// The body is not part of `Parts`; pass it separately when the signer
    /// hashes payloads.
    pub async fn sign_parts(
        &self,
        parts: &mut http::request::Parts,
        body: Option<bytes::Bytes>,
    ) -> Result<()> {
        // Load the credential first: `from_parts` moves the uri and headers out.
        let cred = self.credential().await?;
        let mut req = SigningRequest::from_parts(parts)?;
        req.body = body;
        if let Err(err) = self.signer.sign_request(&mut req, &cred) {
            // Hand the untouched headers and uri back before failing.
            req.apply(parts)?;
            return Err(err);
        }
        req.apply(parts)
    }
}
