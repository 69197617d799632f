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

use crate::{Context, Result, SigningRequest};
use std::fmt::Debug;

/// SigningCredential is the trait implemented by credentials a signer consumes.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is usable right now.
    ///
    /// Implementations return `false` for empty keys or credentials that are
    /// about to expire, which makes [`crate::Signer`] fetch fresh ones.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        self.as_ref().is_some_and(T::is_valid)
    }
}

/// ProvideCredential loads a credential from some source: static
/// configuration, environment variables or a metadata endpoint.
///
/// Returning `Ok(None)` means "this source has nothing", which lets chains
/// move on to the next provider.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load the credential.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest computes a signature for a request and attaches it.
///
/// Signing is pure and synchronous: for the same credential and request
/// (including its timestamp headers or parameters) the output is byte
/// identical. Implementations must not mutate `req` when they return an
/// error.
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place by adding headers or query parameters.
    fn sign_request(&self, req: &mut SigningRequest, cred: &Self::Credential) -> Result<()>;
}
