use super::{init_signer, sign};
use awsign_aws::{SignatureVersion, SigningConfig, StaticCredentialProvider};
use awsign_core::Result;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE, HOST};
use http::Request;
use pretty_assertions::assert_eq;

fn describe_table() -> Result<Request<Bytes>> {
    Ok(Request::post("https://dynamodb.us-east-1.amazonaws.com/")
        .header(CONTENT_TYPE, "application/x-amz-json-1.0")
        .header(DATE, "Mon, 09 Sep 2013 08:07:06 GMT")
        .header(HOST, "dynamodb.us-east-1.amazonaws.com")
        .header("x-amz-target", "DynamoDB_20120810.DescribeTable")
        .body(Bytes::from_static(br#"{"TableName":"Music"}"#))?)
}

#[tokio::test]
async fn test_dynamodb_describe_table() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::V4,
        SigningConfig::new("dynamodb").with_region("us-east-1"),
        StaticCredentialProvider::new("AKIDEXAMPLE", "secret"),
    );

    let req = sign(&signer, describe_table()?).await?;
    assert_eq!(
        req.headers()[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20130909/us-east-1/dynamodb/aws4_request, SignedHeaders=content-type;date;host;x-amz-target, Signature=7d28f43d324113e0c5650bacf668fee07d5c569c6a34bde2f1f5a91d7d7fcd68"
    );
    Ok(())
}

#[tokio::test]
async fn test_resigning_gives_same_signature() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::V4,
        SigningConfig::new("dynamodb").with_region("us-east-1"),
        StaticCredentialProvider::new("AKIDEXAMPLE", "secret"),
    );

    let first = sign(&signer, describe_table()?).await?;
    let second = sign(&signer, first.clone()).await?;
    assert_eq!(
        first.headers()[AUTHORIZATION],
        second.headers()[AUTHORIZATION]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_date_leaves_request_untouched() -> Result<()> {
    let signer = init_signer(
        SignatureVersion::V4,
        SigningConfig::new("dynamodb").with_region("us-east-1"),
        StaticCredentialProvider::new("AKIDEXAMPLE", "secret"),
    );

    let mut req = describe_table()?;
    req.headers_mut().remove(DATE);
    let (mut parts, body) = req.into_parts();
    let before = parts.headers.clone();

    let err = signer
        .sign_parts(&mut parts, Some(body))
        .await
        .expect_err("signing without date must fail");
    assert!(err.is_signing_error());
    assert_eq!(parts.headers, before);
    assert!(parts.headers.get(AUTHORIZATION).is_none());
    Ok(())
}
