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

//! Retry policies deciding whether a failed service call is worth repeating.

use http::StatusCode;
use std::fmt::Debug;
use std::time::Duration;

const MAX_DELAY: Duration = Duration::from_secs(20);

/// Error codes that always indicate throttling.
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ProvisionedThroughputExceededException",
];

/// RetryInput describes the outcome of one failed call.
#[derive(Debug, Default, Clone, Copy)]
pub struct RetryInput<'a> {
    /// HTTP status, if a response arrived.
    pub status: Option<StatusCode>,
    /// Service error code decoded from the response, e.g. `Throttling`.
    pub error_code: Option<&'a str>,
    /// The transport failed in a way that is usually transient.
    pub transient: bool,
}

/// RetryPolicy encapsulates a strategy for client retries.
pub trait RetryPolicy: Debug + Send + Sync + 'static {
    /// Whether a failed request should be retried after `num_retries`
    /// retries already happened.
    fn should_retry(&self, input: &RetryInput<'_>, num_retries: u32) -> bool;

    /// How long to wait before issuing retry number `num_retries`.
    fn delay(&self, num_retries: u32) -> Duration;
}

/// The default policy used by most AWS SDKs: 3 retries, 300ms base.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, input: &RetryInput<'_>, num_retries: u32) -> bool {
        should_retry(input, num_retries, 3)
    }

    fn delay(&self, num_retries: u32) -> Duration {
        exponential_backoff(num_retries, Duration::from_millis(300))
    }
}

/// DynamoDB tolerates more retries with a shorter base delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamoDbRetryPolicy;

impl RetryPolicy for DynamoDbRetryPolicy {
    fn should_retry(&self, input: &RetryInput<'_>, num_retries: u32) -> bool {
        should_retry(input, num_retries, 10)
    }

    fn delay(&self, num_retries: u32) -> Duration {
        exponential_backoff(num_retries, Duration::from_millis(25))
    }
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetryPolicy;

impl RetryPolicy for NeverRetryPolicy {
    fn should_retry(&self, _: &RetryInput<'_>, _: u32) -> bool {
        false
    }

    fn delay(&self, _: u32) -> Duration {
        Duration::ZERO
    }
}

fn should_retry(input: &RetryInput<'_>, num_retries: u32, max_retries: u32) -> bool {
    if num_retries >= max_retries {
        return false;
    }
    if input.transient {
        return true;
    }
    if input.status.is_some_and(|s| s.is_server_error()) {
        return true;
    }
    input
        .error_code
        .is_some_and(|code| THROTTLING_CODES.contains(&code))
}

fn exponential_backoff(num_retries: u32, scale: Duration) -> Duration {
    if num_retries == 0 {
        return Duration::ZERO;
    }

    // 2^n grows past MAX_DELAY long before it overflows; clamp the shift.
    let factor = 1u32 << num_retries.min(16);
    scale.saturating_mul(factor).min(MAX_DELAY)
}
