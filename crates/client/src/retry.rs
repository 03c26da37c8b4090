// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-delay retry policy shared by reconnection and request retries.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How long to wait between attempts and how many attempts to make.
///
/// `max_attempts: None` retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const fn unbounded(delay: Duration) -> Self {
        RetryPolicy {
            delay,
            max_attempts: None,
        }
    }

    pub const fn bounded(delay: Duration, max_attempts: u32) -> Self {
        RetryPolicy {
            delay,
            max_attempts: Some(max_attempts),
        }
    }

    /// Whether another attempt is allowed after `attempts` have failed.
    pub fn allows(&self, attempts: u32) -> bool {
        !matches!(self.max_attempts, Some(max) if attempts >= max)
    }

    /// Sleep for the retry delay. Returns `false` if cancelled first.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
