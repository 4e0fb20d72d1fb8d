//! Timeout configuration for catalog requests.

use std::time::Duration;

/// Timeouts applied to every catalog request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total operation timeout.
    pub total: Duration,
}

impl TimeoutConfig {
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self {
            connect: connect.min(total),
            total,
        }
    }

    /// Derive a connect timeout of a quarter of the total.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: total / 4,
            total,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(3),
            total: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total() {
        let t = TimeoutConfig::from_total(Duration::from_secs(8));
        assert_eq!(t.connect, Duration::from_secs(2));
    }

    #[test]
    fn test_connect_capped_by_total() {
        let t = TimeoutConfig::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(t.connect, Duration::from_secs(1));
    }
}
