//! AWS request signing.
//!
//! This crate implements the signature schemes spoken by AWS services:
//!
//! - [`QueryV2Signer`]: Signature V2 for query APIs such as SQS or IAM.
//! - [`OperationV2Signer`]: the service/operation/timestamp scheme of MTurk.
//! - [`S3V2Signer`]: S3 header signatures and pre-signed URLs.
//! - [`V4Signer`]: Signature V4.
//! - [`Route53Signer`]: the `AWS3-HTTPS` scheme of Route53.
//!
//! Credentials come from the providers in this crate and are cached by
//! [`awsign_core::Signer`]. [`Service`] ties a signer to an endpoint and
//! retries failed calls.
//!
//! ## Example
//!
//! ```no_run
//! use awsign_aws::{make_params, DefaultCredentialProvider, Service, ServiceInfo, SignatureVersion};
//! use awsign_core::{Context, OsEnv, Result};
//! use awsign_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_env(OsEnv)
//!         .with_http_send(ReqwestHttpSend::default());
//!     let svc = Service::new(
//!         ctx,
//!         DefaultCredentialProvider::new(),
//!         ServiceInfo {
//!             endpoint: "https://sqs.us-east-1.amazonaws.com".to_string(),
//!             signature_version: SignatureVersion::V4,
//!             service: "sqs".to_string(),
//!             region: Some("us-east-1".to_string()),
//!         },
//!     )?;
//!
//!     let body = svc
//!         .query(http::Method::POST, "/", &make_params("ListQueues"))
//!         .await?;
//!     println!("{}", String::from_utf8_lossy(&body));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

pub mod region;
pub use region::{instance_region, Region};

mod sign_v2;
pub use sign_v2::{operation_signature, OperationV2Signer, QueryV2Signer};

mod sign_s3;
pub use sign_s3::S3V2Signer;

mod sign_v4;
pub use sign_v4::{derive_signing_key, V4Signer};

mod sign_route53;
pub use sign_route53::Route53Signer;

mod signature;
pub use signature::{AwsSigner, SignatureVersion, SigningConfig};

mod service;
pub use service::{make_params, Service, ServiceError, ServiceInfo};

/// Percent-encode a string the way AWS canonical requests expect.
pub use awsign_core::utils::uri_encode as encode;
