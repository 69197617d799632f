//! Core components for signing AWS API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! awsign service crates. It knows nothing about any particular signature
//! scheme; those live in `awsign-aws`.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: holds the HTTP client and environment access used while loading credentials
//! - **Traits**: [`ProvideCredential`] loads credentials, [`SignRequest`] signs a [`SigningRequest`]
//! - **Signer**: caches credentials and coordinates loading and signing
//! - **Attempt**: a timing gate for retry loops, paired with a [`RetryPolicy`]
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use awsign_core::{Context, ProvideCredential, Result, SignRequest, Signer};
//! use awsign_core::{SigningCredential, SigningRequest};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<MyCredential>> {
//!         Ok(Some(MyCredential { key: "my-access-key".to_string() }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     fn sign_request(&self, req: &mut SigningRequest, cred: &MyCredential) -> Result<()> {
//!         req.insert_header("authorization", &cred.key, true)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MySigner);
//!
//! let mut parts = http::Request::get("https://example.com")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign_parts(&mut parts, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: hashing and HMAC helpers
//! - [`time`]: the date formats AWS signatures use
//! - [`utils`]: RFC 3986 encoding and secret redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;

mod attempt;
pub use attempt::{Attempt, AttemptStrategy};
mod retry;
pub use retry::{
    DefaultRetryPolicy, DynamoDbRetryPolicy, NeverRetryPolicy, RetryInput, RetryPolicy,
};

mod error;
pub use error::{Error, ErrorKind, Result};
