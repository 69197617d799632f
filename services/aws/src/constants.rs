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

// Headers used in aws services.
pub const CONTENT_MD5: &str = "content-md5";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
pub const X_AMZN_AUTHORIZATION: &str = "x-amzn-authorization";
pub const X_AMZ_PREFIX: &str = "x-amz-";

// Query parameters used by the V2 signers.
pub const AWS_ACCESS_KEY_ID_PARAM: &str = "AWSAccessKeyId";
pub const SIGNATURE_PARAM: &str = "Signature";
pub const SIGNATURE_VERSION_PARAM: &str = "SignatureVersion";
pub const SIGNATURE_METHOD_PARAM: &str = "SignatureMethod";
pub const SECURITY_TOKEN_PARAM: &str = "SecurityToken";
pub const TIMESTAMP_PARAM: &str = "Timestamp";
pub const EXPIRES_PARAM: &str = "Expires";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SECRET_KEY: &str = "AWS_SECRET_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_EC2_METADATA_SERVICE_ENDPOINT: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";
pub const AWS_EC2_METADATA_DISABLED: &str = "AWS_EC2_METADATA_DISABLED";

pub const DEFAULT_EC2_METADATA_ENDPOINT: &str = "http://169.254.169.254";
