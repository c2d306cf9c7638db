// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar helpers pinned to the reference timezone.
//!
//! Quota periods and due dates follow the users' local calendar, not UTC and
//! not the server's zone.

use bolso_core::BolsoError;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Converts instants into local calendar values.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceClock {
    offset: FixedOffset,
}

impl ReferenceClock {
    /// Build a clock for a fixed UTC offset in minutes (negative = west).
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, BolsoError> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            BolsoError::Config(format!("utc offset of {minutes} minutes is out of range"))
        })?;
        Ok(Self { offset })
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Local calendar date of `at`.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Usage period key (`YYYY-MM`) of `at`.
    pub fn period_key(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%Y-%m").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sao_paulo() -> ReferenceClock {
        ReferenceClock::from_offset_minutes(-180).unwrap()
    }

    #[test]
    fn late_evening_stays_on_local_day() {
        // 23:30 in São Paulo is already the next day in UTC.
        let at = Utc.with_ymd_and_hms(2026, 3, 8, 2, 30, 0).unwrap();
        assert_eq!(
            sao_paulo().local_date(at),
            NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
        );
    }

    #[test]
    fn period_follows_local_month() {
        let at = Utc.with_ymd_and_hms(2026, 4, 1, 1, 0, 0).unwrap();
        assert_eq!(sao_paulo().period_key(at), "2026-03");
        let at = Utc.with_ymd_and_hms(2026, 4, 1, 3, 0, 0).unwrap();
        assert_eq!(sao_paulo().period_key(at), "2026-04");
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        assert!(ReferenceClock::from_offset_minutes(24 * 60).is_err());
    }
}
