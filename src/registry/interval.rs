//! Interval Module
//!
//! Fixed re-trigger periods for periodic jobs.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};

// == Interval Unit ==
/// Unit an interval is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    fn seconds(self) -> u64 {
        match self {
            IntervalUnit::Seconds => 1,
            IntervalUnit::Minutes => 60,
            IntervalUnit::Hours => 60 * 60,
            IntervalUnit::Days => 24 * 60 * 60,
        }
    }
}

// == Interval ==
/// A positive period such as "every 5 minutes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    every: u64,
    unit: IntervalUnit,
}

impl Interval {
    /// Creates an interval, rejecting a zero period.
    pub fn new(every: u64, unit: IntervalUnit) -> Result<Self> {
        if every == 0 {
            return Err(TaskError::InvalidInterval(format!(
                "every must be positive (got 0 {unit})"
            )));
        }
        Ok(Self { every, unit })
    }

    pub fn every(&self) -> u64 {
        self.every
    }

    pub fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// Normalized length of the interval.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.every.saturating_mul(self.unit.seconds()))
    }

    /// Same length as a chrono duration, for wall-clock arithmetic.
    pub fn chrono_duration(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.duration()).unwrap_or(chrono::Duration::MAX)
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} {}", self.every, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_rejects_zero() {
        let result = Interval::new(0, IntervalUnit::Minutes);
        assert!(matches!(result, Err(TaskError::InvalidInterval(_))));
    }

    #[test]
    fn test_interval_duration() {
        assert_eq!(
            Interval::new(5, IntervalUnit::Minutes).unwrap().duration(),
            Duration::from_secs(300)
        );
        assert_eq!(
            Interval::new(24, IntervalUnit::Hours).unwrap().duration(),
            Interval::new(1, IntervalUnit::Days).unwrap().duration()
        );
    }

    #[test]
    fn test_interval_display() {
        let interval = Interval::new(1, IntervalUnit::Hours).unwrap();
        assert_eq!(interval.to_string(), "every 1 hours");
    }
}
