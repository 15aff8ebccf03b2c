//! Entry filters and host time conversion.
//!
//! Callers pick calendar dates in the host's local time zone. The host stores
//! and filters timestamps in its reference time (UTC), so a date range is
//! widened to whole local days and then shifted to reference time:
//! the start date becomes `00:00:00` local, the end date `23:59:59` local.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use mfx_model::{Entry, EntryStatus};

/// Comparison applied by a [`FieldFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Is,
    IsNot,
    Contains,
}

/// Restriction on one stored entry value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub key: String,
    #[serde(default)]
    pub operator: FilterOperator,
    pub value: String,
}

impl FieldFilter {
    pub fn is(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator: FilterOperator::Is,
            value: value.into(),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        let stored = entry.value(&self.key);
        match self.operator {
            FilterOperator::Is => stored == self.value,
            FilterOperator::IsNot => stored != self.value,
            FilterOperator::Contains => stored.contains(&self.value),
        }
    }
}

/// Search criteria passed to the host for counting and fetching entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub status: EntryStatus,
    /// Inclusive lower bound, host reference time.
    pub start: Option<NaiveDateTime>,
    /// Inclusive upper bound, host reference time.
    pub end: Option<NaiveDateTime>,
    /// All filters must match.
    pub field_filters: Vec<FieldFilter>,
}

impl EntryFilter {
    /// Active entries only, no bounds.
    pub fn active() -> Self {
        Self::default()
    }

    /// Whether `entry` satisfies every criterion.
    pub fn matches(&self, entry: &Entry) -> bool {
        if entry.status != self.status {
            return false;
        }
        if self.start.is_some_and(|start| entry.date_created < start) {
            return false;
        }
        if self.end.is_some_and(|end| entry.date_created > end) {
            return false;
        }
        self.field_filters.iter().all(|filter| filter.matches(entry))
    }
}

/// Host local time zone relative to the reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostClock {
    offset: FixedOffset,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl HostClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Reference timestamp of `00:00:00` local time on `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> NaiveDateTime {
        self.to_reference(date.and_time(NaiveTime::MIN))
    }

    /// Reference timestamp of `23:59:59` local time on `date`.
    pub fn end_of_day(&self, date: NaiveDate) -> NaiveDateTime {
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.to_reference(date.and_time(end))
    }

    /// Shift a local wall-clock time to reference time.
    ///
    /// Saturates at the ends of the representable range.
    pub fn to_reference(&self, local: NaiveDateTime) -> NaiveDateTime {
        shift(local, -i64::from(self.offset.local_minus_utc()))
    }

    /// Shift a reference timestamp to local wall-clock time.
    ///
    /// Saturates at the ends of the representable range.
    pub fn to_local(&self, reference: NaiveDateTime) -> NaiveDateTime {
        shift(reference, i64::from(self.offset.local_minus_utc()))
    }

    /// Build the filter for an inclusive local date range.
    pub fn date_filter(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> EntryFilter {
        EntryFilter {
            start: start.map(|date| self.start_of_day(date)),
            end: end.map(|date| self.end_of_day(date)),
            ..EntryFilter::active()
        }
    }
}

fn shift(datetime: NaiveDateTime, seconds: i64) -> NaiveDateTime {
    datetime
        .checked_add_signed(TimeDelta::seconds(seconds))
        .unwrap_or(if seconds < 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
}
