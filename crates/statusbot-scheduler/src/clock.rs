//! Clock source: wall time resolved into a civil calendar for one zone.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Civil date and time-of-day, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl LocalTime {
    pub fn from_datetime<Z: TimeZone>(dt: &DateTime<Z>) -> Self {
        Self {
            date: dt.date_naive(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }
}

impl std::fmt::Display for LocalTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.hour,
            self.minute
        )
    }
}

/// Source of "now". Faked in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalTime;
}

/// System clock viewed through an IANA time zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> LocalTime {
        LocalTime::from_datetime(&Utc::now().with_timezone(&self.tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_resolution_crosses_date_line() {
        // 01:30 UTC on Mar 2 is 22:30 on Mar 1 in São Paulo (UTC-3).
        let utc = Utc.with_ymd_and_hms(2026, 3, 2, 1, 30, 0).unwrap();
        let local = LocalTime::from_datetime(&utc.with_timezone(&chrono_tz::America::Sao_Paulo));
        assert_eq!(local.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!((local.hour, local.minute), (22, 30));
        assert_eq!(local.to_string(), "2026-03-01 22:30");
    }

    #[test]
    fn test_zoned_clock_reports_valid_time() {
        let now = ZonedClock::new(chrono_tz::America::Sao_Paulo).now();
        assert!(now.hour < 24);
        assert!(now.minute < 60);
    }
}
