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


//! AWS regions and the endpoints of the services they host.

use awsign_core::{Context, Result};

use crate::{Config, ImdsCredentialProvider, ServiceInfo, SignatureVersion};

/// A region and the rules for reaching services inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    name: &'static str,
    domain: &'static str,
    iam_host: &'static str,
    s3_location_constraint: bool,
}

impl Region {
    const fn new(name: &'static str, domain: &'static str, iam_host: &'static str) -> Self {
        Self {
            name,
            domain,
            iam_host,
            s3_location_constraint: true,
        }
    }
}

/// US East (N. Virginia).
pub const US_EAST_1: Region = Region {
    s3_location_constraint: false,
    ..Region::new("us-east-1", "amazonaws.com", "iam.amazonaws.com")
};
/// US West (N. California).
pub const US_WEST_1: Region = Region::new("us-west-1", "amazonaws.com", "iam.amazonaws.com");
/// US West (Oregon).
pub const US_WEST_2: Region = Region::new("us-west-2", "amazonaws.com", "iam.amazonaws.com");
/// EU (Ireland).
pub const EU_WEST_1: Region = Region::new("eu-west-1", "amazonaws.com", "iam.amazonaws.com");
/// Asia Pacific (Singapore).
pub const AP_SOUTHEAST_1: Region =
    Region::new("ap-southeast-1", "amazonaws.com", "iam.amazonaws.com");
/// Asia Pacific (Sydney).
pub const AP_SOUTHEAST_2: Region =
    Region::new("ap-southeast-2", "amazonaws.com", "iam.amazonaws.com");
/// Asia Pacific (Tokyo).
pub const AP_NORTHEAST_1: Region =
    Region::new("ap-northeast-1", "amazonaws.com", "iam.amazonaws.com");
/// South America (São Paulo).
pub const SA_EAST_1: Region = Region::new("sa-east-1", "amazonaws.com", "iam.amazonaws.com");
/// AWS GovCloud (US).
pub const US_GOV_WEST_1: Region =
    Region::new("us-gov-west-1", "amazonaws.com", "iam.us-gov.amazonaws.com");
/// China (Beijing).
pub const CN_NORTH_1: Region =
    Region::new("cn-north-1", "amazonaws.com.cn", "iam.cn-north-1.amazonaws.com.cn");

static REGIONS: &[Region] = &[
    US_EAST_1,
    US_WEST_1,
    US_WEST_2,
    EU_WEST_1,
    AP_SOUTHEAST_1,
    AP_SOUTHEAST_2,
    AP_NORTHEAST_1,
    SA_EAST_1,
    US_GOV_WEST_1,
    CN_NORTH_1,
];

impl Region {
    /// Look up a known region by its canonical name.
    pub fn by_name(name: &str) -> Option<&'static Region> {
        REGIONS.iter().find(|r| r.name == name)
    }

    /// All known regions.
    pub fn all() -> &'static [Region] {
        REGIONS
    }

    /// Resolve the region named by `config`, see [`Config::region`].
    pub fn from_config(config: &Config) -> Option<&'static Region> {
        config.region.as_deref().and_then(Self::by_name)
    }

    /// Canonical name, e.g. `us-east-1`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether S3 bucket creation here needs a `LocationConstraint`.
    pub fn s3_location_constraint(&self) -> bool {
        self.s3_location_constraint
    }

    /// Endpoint URL of `service` (the endpoint prefix, e.g. `ec2`,
    /// `monitoring` or `elasticloadbalancing`) in this region.
    pub fn endpoint(&self, service: &str) -> String {
        match service {
            "iam" => format!("https://{}", self.iam_host),
            "route53" => format!("https://route53.{}", self.domain),
            // Served from the global endpoint in us-east-1.
            "s3" | "sdb" if self.name == US_EAST_1.name => {
                format!("https://{service}.{}", self.domain)
            }
            _ => format!("https://{service}.{}.{}", self.name, self.domain),
        }
    }

    /// Describe `service` in this region for [`crate::Service::new`].
    pub fn service_info(&self, service: &str, signature_version: SignatureVersion) -> ServiceInfo {
        // Global services sign their scope with us-east-1.
        let region = match service {
            "iam" | "route53" if self.domain == US_EAST_1.domain => US_EAST_1.name,
            _ => self.name,
        };
        ServiceInfo {
            endpoint: self.endpoint(service),
            signature_version,
            service: service.to_string(),
            region: Some(region.to_string()),
        }
    }
}

/// Region of the EC2 instance this process runs on, read from the instance
/// metadata service configured in `ctx`'s environment.
pub async fn instance_region(ctx: &Context) -> Result<String> {
    let config = Config::default().from_env(ctx);
    ImdsCredentialProvider::from_config(&config).region(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use async_trait::async_trait;
    use awsign_core::{HttpSend, StaticEnv};
    use bytes::Bytes;
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_by_name() {
        assert_eq!(Region::by_name("eu-west-1"), Some(&EU_WEST_1));
        assert_eq!(Region::by_name("mars-north-1"), None);
        assert_eq!(Region::all().len(), 10);
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(US_EAST_1.endpoint("s3"), "https://s3.amazonaws.com");
        assert_eq!(US_WEST_2.endpoint("s3"), "https://s3.us-west-2.amazonaws.com");
        assert_eq!(US_EAST_1.endpoint("sdb"), "https://sdb.amazonaws.com");
        assert_eq!(EU_WEST_1.endpoint("sqs"), "https://sqs.eu-west-1.amazonaws.com");
        assert_eq!(
            AP_NORTHEAST_1.endpoint("monitoring"),
            "https://monitoring.ap-northeast-1.amazonaws.com"
        );
        assert_eq!(SA_EAST_1.endpoint("iam"), "https://iam.amazonaws.com");
        assert_eq!(US_GOV_WEST_1.endpoint("iam"), "https://iam.us-gov.amazonaws.com");
        assert_eq!(CN_NORTH_1.endpoint("ec2"), "https://ec2.cn-north-1.amazonaws.com.cn");
        assert!(!US_EAST_1.s3_location_constraint());
        assert!(EU_WEST_1.s3_location_constraint());
    }

    #[test]
    fn test_service_info() {
        let info = EU_WEST_1.service_info("iam", SignatureVersion::V4);
        assert_eq!(info.endpoint, "https://iam.amazonaws.com");
        assert_eq!(info.region.as_deref(), Some("us-east-1"));

        let info = EU_WEST_1.service_info("dynamodb", SignatureVersion::V4);
        assert_eq!(info.endpoint, "https://dynamodb.eu-west-1.amazonaws.com");
        assert_eq!(info.region.as_deref(), Some("eu-west-1"));
        assert_eq!(info.service, "dynamodb");
    }

    #[test]
    fn test_from_config() {
        let ctx = Context::new().with_env(StaticEnv::from_pairs([(AWS_REGION, "us-west-1")]));

        let config = Config::default().from_env(&ctx);
        assert_eq!(Region::from_config(&config), Some(&US_WEST_1));
        assert_eq!(Region::from_config(&Config::default()), None);
    }

    #[derive(Debug)]
    struct ZoneImds;

    #[async_trait]
    impl HttpSend for ZoneImds {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let body = match req.uri().path() {
                "/latest/api/token" => "token",
                "/latest/meta-data/placement/availability-zone" => "ap-southeast-2a",
                _ => "",
            };
            Ok(http::Response::builder()
                .status(StatusCode::OK)
                .body(Bytes::from(body))?)
        }
    }

    #[tokio::test]
    async fn test_instance_region() -> Result<()> {
        let ctx = Context::new().with_http_send(ZoneImds).with_env(StaticEnv::from_pairs([(
            AWS_EC2_METADATA_SERVICE_ENDPOINT,
            "http://127.0.0.1:1338",
        )]));

        let region = instance_region(&ctx).await?;
        assert_eq!(region, "ap-southeast-2");
        assert_eq!(Region::by_name(&region), Some(&AP_SOUTHEAST_2));
        Ok(())
    }
}
