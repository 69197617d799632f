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

//! Timing gate for retry loops.
//!
//! An [`AttemptStrategy`] describes a window (`total`) and a minimum spacing
//! between tries (`delay`). Each retried operation drives its own
//! [`Attempt`]:
//!
//! ```no_run
//! use awsign_core::AttemptStrategy;
//! use std::time::Duration;
//!
//! # fn call() -> Result<(), ()> { Ok(()) }
//! let strategy = AttemptStrategy::new(Duration::from_secs(5), Duration::from_millis(200));
//! let mut attempt = strategy.start();
//! while attempt.next() {
//!     if call().is_ok() || !attempt.has_next() {
//!         break;
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

/// AttemptStrategy is the immutable configuration of a retry window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptStrategy {
    /// Total duration during which new tries may start.
    pub total: Duration,
    /// Minimum interval between the start of two tries.
    pub delay: Duration,
}

impl AttemptStrategy {
    /// Create a new strategy.
    pub fn new(total: Duration, delay: Duration) -> Self {
        Self { total, delay }
    }

    /// Begin a new sequence of tries.
    pub fn start(&self) -> Attempt {
        Attempt {
            strategy: *self,
            last: None,
            started: false,
            end: None,
            force: false,
            count: 0,
        }
    }
}

/// Attempt is the mutable state of one retried operation.
#[derive(Debug)]
pub struct Attempt {
    strategy: AttemptStrategy,
    last: Option<Instant>,
    started: bool,
    /// `None` once started means the window never closes.
    end: Option<Instant>,
    force: bool,
    count: usize,
}

enum Plan {
    Stop,
    Proceed(Duration),
}

impl Attempt {
    /// Wait until it is time for the next try, or return `false` when the
    /// window is over.
    ///
    /// The first call always returns `true` immediately. This blocks the
    /// current thread; use [`Attempt::next_async`] inside async code.
    pub fn next(&mut self) -> bool {
        match self.plan(Instant::now()) {
            Plan::Stop => false,
            Plan::Proceed(sleep) => {
                if !sleep.is_zero() {
                    std::thread::sleep(sleep);
                }
                self.record(Instant::now());
                true
            }
        }
    }

    /// Async version of [`Attempt::next`].
    ///
    /// Dropping the returned future while it sleeps (for example through
    /// `tokio::time::timeout` or `tokio::select!`) abandons that try.
    pub async fn next_async(&mut self) -> bool {
        match self.plan(Instant::now()) {
            Plan::Stop => false,
            Plan::Proceed(sleep) => {
                if !sleep.is_zero() {
                    tokio::time::sleep(sleep).await;
                }
                self.record(Instant::now());
                true
            }
        }
    }

    /// Report whether another try will be made if the current one fails.
    ///
    /// A `true` answer is a promise: the following call to `next` returns
    /// `true` even if the window closes in between.
    pub fn has_next(&mut self) -> bool {
        if !self.started || self.force {
            return true;
        }

        let now = Instant::now();
        if self.within_window(now, self.owed_delay(now)) {
            self.force = true;
            return true;
        }
        false
    }

    /// Number of tries started so far.
    pub fn count(&self) -> usize {
        self.count
    }

    fn plan(&mut self, now: Instant) -> Plan {
        if !self.started {
            self.started = true;
            self.end = now.checked_add(self.strategy.total);
            self.force = false;
            return Plan::Proceed(Duration::ZERO);
        }

        let sleep = self.owed_delay(now);
        if !self.force && !self.within_window(now, sleep) {
            return Plan::Stop;
        }
        self.force = false;
        Plan::Proceed(sleep)
    }

    fn record(&mut self, now: Instant) {
        self.last = Some(now);
        self.count += 1;
    }

    /// Whether a try starting `sleep` after `now` falls inside the window.
    fn within_window(&self, now: Instant, sleep: Duration) -> bool {
        match self.end {
            None => true,
            Some(end) => now.checked_add(sleep).is_some_and(|at| at < end),
        }
    }

    fn owed_delay(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .strategy
                .delay
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}
