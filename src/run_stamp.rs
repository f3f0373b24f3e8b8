//! Run timestamps embedded in log file names.
//!
//! A [`RunStamp`] is computed once by the caller and passed to every operation
//! of the same run, so the initial-state log and the operation log share a
//! stamp and tests can supply a fixed one.

use chrono::{Local, NaiveDateTime};
use std::fmt;

const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// A minute-resolution timestamp formatted as `YYYY-MM-DD_HH-MM`.
///
/// The zero-padded format sorts lexicographically in chronological order,
/// which the log selector relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunStamp(String);

impl RunStamp {
    /// Stamp for the current local time.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Stamp for a given date and time. Seconds are dropped.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime.format(STAMP_FORMAT).to_string())
    }

    /// Parses a stamp in `YYYY-MM-DD_HH-MM` form.
    ///
    /// # Examples
    ///
    /// ```
    /// use typesort::run_stamp::RunStamp;
    ///
    /// let stamp = RunStamp::parse("2025-03-08_14-05").unwrap();
    /// assert_eq!(stamp.as_str(), "2025-03-08_14-05");
    /// assert!(RunStamp::parse("2025-3-8 14:05").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(value, STAMP_FORMAT)
            .ok()
            .map(Self::from_datetime)
            .filter(|stamp| stamp.0 == value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
