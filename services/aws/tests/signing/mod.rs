mod query;
mod s3;
mod v4;

use awsign_aws::{AwsSigner, Credential, SignatureVersion, SigningConfig, StaticCredentialProvider};
use awsign_core::{Context, Result, Signer};
use bytes::Bytes;
use http::Request;
use log::debug;

/// Build a signer for `version` with fixed credentials.
pub fn init_signer(
    version: SignatureVersion,
    config: SigningConfig,
    provider: StaticCredentialProvider,
) -> Signer<Credential> {
    let _ = env_logger::builder().is_test(true).try_init();

    let signer = AwsSigner::new(version, &config).expect("signer config must be valid");
    Signer::new(Context::new(), provider, signer)
}

/// Sign an `http::Request` in place and hand it back.
pub async fn sign(signer: &Signer<Credential>, req: Request<Bytes>) -> Result<Request<Bytes>> {
    let (mut parts, body) = req.into_parts();
    signer.sign_parts(&mut parts, Some(body.clone())).await?;
    let req = Request::from_parts(parts, body);

    debug!("signed request: {req:?}");
    Ok(req)
}
