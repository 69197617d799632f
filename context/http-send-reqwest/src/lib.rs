//! HTTP client for awsign backed by [`reqwest`].

use async_trait::async_trait;
use awsign_core::{Error, HttpSend, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        debug!("sending {} {}", req.method(), req.url());

        let resp = self.client.execute(req).await.map_err(transport_error)?;
        let resp: http::Response<_> = resp.into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(transport_error)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

/// Timeouts and broken connections are worth another try.
fn transport_error(err: reqwest::Error) -> Error {
    let retryable = err.is_timeout() || err.is_connect() || err.is_body();
    Error::unexpected("failed to send http request")
        .with_source(err)
        .set_retryable(retryable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_refused_is_retryable() {
        let send = ReqwestHttpSend::default();
        let req = http::Request::builder()
            .uri("http://127.0.0.1:1/")
            .body(Bytes::new())
            .expect("request must build");

        let err = send.http_send(req).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
