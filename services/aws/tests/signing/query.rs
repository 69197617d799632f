use super::{init_signer, sign};
use awsign_aws::{SignatureVersion, SigningConfig, StaticCredentialProvider};
use awsign_core::Result;
use bytes::Bytes;
use http::Request;
use pretty_assertions::assert_eq;

const LIST_METRICS: &str = "https://monitoring.us-east-1.amazonaws.com/?Action=ListMetrics&Timestamp=2012-02-16T20%3A30%3A47Z&Namespace=AWS%2FEC2";

fn query_pairs(req: &Request<Bytes>) -> Vec<(String, String)> {
    form_urlencoded::parse(req.uri().query().unwrap_or_default().as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn test_list_metrics() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::V2,
        SigningConfig::new("monitoring"),
        StaticCredentialProvider::new("user", "secret"),
    );

    let req = Request::get(LIST_METRICS).body(Bytes::new())?;
    let req = sign(&signer, req).await?;

    let pairs = query_pairs(&req);
    assert_eq!(
        param(&pairs, "Signature"),
        Some("P3HAuatNd0rgdZ+nzFbJ9vo3Ik8OiU7WPQLILd0wUU0=")
    );
    assert_eq!(param(&pairs, "AWSAccessKeyId"), Some("user"));
    assert_eq!(param(&pairs, "SignatureVersion"), Some("2"));
    Ok(())
}

#[tokio::test]
async fn test_list_metrics_with_session_token() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::V2,
        SigningConfig::new("monitoring"),
        StaticCredentialProvider::new("user", "secret").with_session_token("tok"),
    );

    let req = Request::get(LIST_METRICS).body(Bytes::new())?;
    let req = sign(&signer, req).await?;

    let pairs = query_pairs(&req);
    assert_eq!(param(&pairs, "SecurityToken"), Some("tok"));
    assert_eq!(
        param(&pairs, "Signature"),
        Some("0gF0tqo1YjNrZYswB/qsMxi232s6E/uz5z60oiUnreY=")
    );
    Ok(())
}

#[tokio::test]
async fn test_signing_twice_is_stable() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::V2,
        SigningConfig::new("monitoring"),
        StaticCredentialProvider::new("user", "secret"),
    );

    let first = sign(&signer, Request::get(LIST_METRICS).body(Bytes::new())?).await?;
    let second = sign(&signer, first.clone()).await?;
    assert_eq!(first.uri(), second.uri());
    Ok(())
}

#[tokio::test]
async fn test_mturk_create_hit() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::OperationV2,
        SigningConfig::new("AWSMechanicalTurkRequester"),
        StaticCredentialProvider::new("user", "secret"),
    );

    let req = Request::get(
        "https://mechanicalturk.amazonaws.com/?Operation=CreateHIT&Timestamp=2012-02-16T20%3A30%3A47Z",
    )
    .body(Bytes::new())?;
    let req = sign(&signer, req).await?;

    let pairs = query_pairs(&req);
    assert_eq!(param(&pairs, "Service"), Some("AWSMechanicalTurkRequester"));
    assert_eq!(param(&pairs, "Signature"), Some("b/TnvzrdeD/L/EyzdFrznPXhido="));
    Ok(())
}
