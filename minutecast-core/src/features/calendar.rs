//! Calendar indicators: weekend flag and trading-session membership.
//!
//! All evaluation uses the UTC wall clock of the bar timestamp.

use super::Feature;
use crate::domain::Bar;
use chrono::{Datelike, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A time-of-day interval with explicit boundary inclusion.
///
/// When `start > end` the window wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default = "default_true")]
    pub include_start: bool,
    #[serde(default)]
    pub include_end: bool,
}

fn default_true() -> bool {
    true
}

impl TimeWindow {
    /// `[start, end)`
    pub fn half_open(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            include_start: true,
            include_end: false,
        }
    }

    /// `[start, end]`
    pub fn closed(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            include_start: true,
            include_end: true,
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        let after_start = if self.include_start {
            time >= self.start
        } else {
            time > self.start
        };
        let before_end = if self.include_end {
            time <= self.end
        } else {
            time < self.end
        };

        if self.start <= self.end {
            after_start && before_end
        } else {
            after_start || before_end
        }
    }
}

/// A named trading session: the union of its windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub windows: Vec<TimeWindow>,
}

fn hms(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

impl Session {
    /// London: [07:00, 13:30).
    pub fn london() -> Self {
        Self {
            name: "London".into(),
            windows: vec![TimeWindow::half_open(hms(7, 0), hms(13, 30))],
        }
    }

    /// Asia: [21:00, 23:59] ∪ [00:00, 07:00).
    pub fn asia() -> Self {
        Self {
            name: "Asia".into(),
            windows: vec![
                TimeWindow::closed(hms(21, 0), hms(23, 59)),
                TimeWindow::half_open(hms(0, 0), hms(7, 0)),
            ],
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.windows.iter().any(|w| w.contains(time))
    }
}

/// 1.0 when the bar falls inside the session, else 0.0.
#[derive(Debug, Clone)]
pub struct SessionFlag {
    session: Session,
}

impl SessionFlag {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Feature for SessionFlag {
    fn name(&self) -> &str {
        &self.session.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| flag(self.session.contains(b.timestamp.time())))
            .collect()
    }
}

/// 1.0 on Saturday and Sunday.
#[derive(Debug, Clone, Default)]
pub struct Weekend;

impl Feature for Weekend {
    fn name(&self) -> &str {
        "weekend"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| {
                flag(matches!(
                    b.timestamp.weekday(),
                    Weekday::Sat | Weekday::Sun
                ))
            })
            .collect()
    }
}

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}
