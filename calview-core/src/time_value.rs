//! Temporal values as they appear in ICS: a bare date, a floating date-time,
//! or a date-time anchored to an IANA zone.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, offset::LocalResult,
};
use chrono_tz::Tz;
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::error::{CalViewError, CalViewResult};

pub(crate) const ICS_FORMAT_DATE: &str = "%Y%m%d";
pub(crate) const ICS_FORMAT_DATETIME: &str = "%Y%m%dT%H%M%S";

/// The shape of a [`TimeValue`], which is what decides an event's variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKind {
    /// Calendar date, no time of day.
    Date,
    /// Date-time without a zone.
    Floating,
    /// Date-time anchored to a zone.
    Zoned,
}

/// A date, a floating date-time, or a zone-aware date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue {
    /// Date only without time.
    Date(NaiveDate),

    /// Wall-clock date and time without timezone. Never converted.
    Floating(NaiveDateTime),

    /// Date and time in a specific IANA zone (UTC for `Z` values).
    Zoned(DateTime<Tz>),
}

impl TimeValue {
    pub fn kind(&self) -> TimeKind {
        match self {
            TimeValue::Date(_) => TimeKind::Date,
            TimeValue::Floating(_) => TimeKind::Floating,
            TimeValue::Zoned(_) => TimeKind::Zoned,
        }
    }

    /// The date as written, without any zone conversion.
    pub fn date(&self) -> NaiveDate {
        match self {
            TimeValue::Date(d) => *d,
            TimeValue::Floating(dt) => dt.date(),
            TimeValue::Zoned(dt) => dt.date_naive(),
        }
    }

    /// The time of day as written, if any.
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            TimeValue::Date(_) => None,
            TimeValue::Floating(dt) => Some(dt.time()),
            TimeValue::Zoned(dt) => Some(dt.time()),
        }
    }

    /// The zone of a zone-aware value.
    pub fn timezone(&self) -> Option<Tz> {
        match self {
            TimeValue::Zoned(dt) => Some(dt.timezone()),
            _ => None,
        }
    }

    /// Wall-clock time as seen from `tz`.
    ///
    /// Zone-aware values are converted; floating values are taken as they are and
    /// dates are placed at midnight.
    pub fn local_naive(&self, tz: &Tz) -> NaiveDateTime {
        match self {
            TimeValue::Date(d) => NaiveDateTime::new(*d, NaiveTime::MIN),
            TimeValue::Floating(dt) => *dt,
            TimeValue::Zoned(dt) => dt.with_timezone(tz).naive_local(),
        }
    }

    /// The calendar day this value falls on as seen from `tz`.
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.local_naive(tz).date()
    }

    /// Anchor a floating value in `tz`. Other values are returned unchanged.
    pub fn anchored_in(self, tz: &Tz) -> Self {
        match self {
            TimeValue::Floating(naive) => TimeValue::Zoned(from_local_datetime(tz, naive)),
            other => other,
        }
    }

    /// Converts a parsed ICS value, resolving its TZID through chrono-tz.
    pub fn from_ics(dpt: DatePerhapsTime) -> CalViewResult<Self> {
        match dpt {
            DatePerhapsTime::Date(d) => Ok(TimeValue::Date(d)),
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
                Ok(TimeValue::Floating(naive))
            }
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => {
                Ok(TimeValue::Zoned(dt.with_timezone(&Tz::UTC)))
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                let tz = resolve_tzid(&tzid)?;
                Ok(TimeValue::Zoned(from_local_datetime(&tz, date_time)))
            }
        }
    }

    /// Renders the value as ICS parameters and property value.
    pub(crate) fn to_ics(&self) -> (Vec<(String, String)>, String) {
        match self {
            TimeValue::Date(d) => (
                vec![("VALUE".to_string(), "DATE".to_string())],
                d.format(ICS_FORMAT_DATE).to_string(),
            ),
            TimeValue::Floating(dt) => (Vec::new(), dt.format(ICS_FORMAT_DATETIME).to_string()),
            TimeValue::Zoned(dt) if dt.timezone() == Tz::UTC => {
                (Vec::new(), format!("{}Z", dt.format(ICS_FORMAT_DATETIME)))
            }
            TimeValue::Zoned(dt) => (
                vec![("TZID".to_string(), dt.timezone().name().to_string())],
                dt.naive_local().format(ICS_FORMAT_DATETIME).to_string(),
            ),
        }
    }

    /// Parses `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS` into a
    /// date or floating value.
    pub fn parse_stable(s: &str) -> Option<Self> {
        match s.len() {
            10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(TimeValue::Date)
                .ok(),
            16 => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
                .map(TimeValue::Floating)
                .ok(),
            19 => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(TimeValue::Floating)
                .ok(),
            _ => None,
        }
    }
}

/// Values of the same kind are ordered; values of different kinds are not comparable.
impl PartialOrd for TimeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (TimeValue::Date(a), TimeValue::Date(b)) => Some(a.cmp(b)),
            (TimeValue::Floating(a), TimeValue::Floating(b)) => Some(a.cmp(b)),
            (TimeValue::Zoned(a), TimeValue::Zoned(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TimeValue::Floating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            TimeValue::Zoned(dt) => write!(
                f,
                "{} {}",
                dt.format("%Y-%m-%d %H:%M:%S"),
                dt.timezone().name()
            ),
        }
    }
}

impl From<NaiveDate> for TimeValue {
    fn from(d: NaiveDate) -> Self {
        TimeValue::Date(d)
    }
}

impl From<NaiveDateTime> for TimeValue {
    fn from(dt: NaiveDateTime) -> Self {
        TimeValue::Floating(dt)
    }
}

impl From<DateTime<Tz>> for TimeValue {
    fn from(dt: DateTime<Tz>) -> Self {
        TimeValue::Zoned(dt)
    }
}

impl Add<Duration> for TimeValue {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        match self {
            TimeValue::Date(d) => TimeValue::Date(d + Duration::days(rhs.num_days())),
            TimeValue::Floating(dt) => TimeValue::Floating(dt + rhs),
            TimeValue::Zoned(dt) => TimeValue::Zoned(dt + rhs),
        }
    }
}

/// Looks up an IANA zone name. Quotes and a leading `/` (globally unique TZID
/// form) are ignored.
pub fn resolve_tzid(tzid: &str) -> CalViewResult<Tz> {
    let name = tzid.trim().trim_matches('"').trim_start_matches('/');
    name.parse::<Tz>().map_err(|_| {
        tracing::debug!(tzid, "timezone not found in chrono-tz database");
        CalViewError::ZoneResolution(tzid.to_string())
    })
}

/// Interpret a wall-clock time in `tz`:
/// - `Single(dt)` returns directly;
/// - `Ambiguous(a, b)` takes the earlier one;
/// - `None` (the time falls into a DST gap) uses the offset in effect before the gap.
pub(crate) fn from_local_datetime(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => {
            tracing::warn!(tz = tz.name(), %naive, "ambiguous local time, picking earliest");
            earliest
        }
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            tracing::warn!(tz = tz.name(), %naive, "nonexistent local time, using offset before the gap");
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, Europe::Berlin};

    fn naive(y: i32, m: u32, d: u32, h: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mm, 0)
            .unwrap()
    }

    #[test]
    fn test_kind_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2014, 4, 9).unwrap();
        let d = TimeValue::Date(date);
        let f = TimeValue::Floating(naive(2014, 4, 9, 9, 30));
        let z = TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 9, 30, 0).unwrap());

        assert_eq!(d.kind(), TimeKind::Date);
        assert_eq!(f.kind(), TimeKind::Floating);
        assert_eq!(z.kind(), TimeKind::Zoned);

        assert_eq!(d.date(), date);
        assert_eq!(f.date(), date);
        assert_eq!(z.date(), date);

        assert_eq!(d.time(), None);
        assert_eq!(f.time(), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(z.time(), NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn test_local_naive_converts_only_zoned_values() {
        let z = TimeValue::Zoned(New_York.with_ymd_and_hms(2014, 4, 9, 22, 30, 0).unwrap());
        // 22:30 EDT is 04:30 CEST on the next day
        assert_eq!(z.local_naive(&Berlin), naive(2014, 4, 10, 4, 30));
        assert_eq!(
            z.local_date(&Berlin),
            NaiveDate::from_ymd_opt(2014, 4, 10).unwrap()
        );

        let f = TimeValue::Floating(naive(2014, 4, 9, 22, 30));
        assert_eq!(f.local_naive(&Berlin), naive(2014, 4, 9, 22, 30));
    }

    #[test]
    fn test_from_ics_resolves_tzid() {
        let dpt = DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone {
            date_time: naive(2014, 4, 9, 9, 30),
            tzid: "Europe/Berlin".to_string(),
        });
        let value = TimeValue::from_ics(dpt).unwrap();
        assert_eq!(
            value,
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 9, 30, 0).unwrap())
        );
        assert_eq!(value.timezone(), Some(Berlin));
    }

    #[test]
    fn test_from_ics_unknown_tzid_is_an_error() {
        let dpt = DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone {
            date_time: naive(2014, 4, 9, 9, 30),
            tzid: "Mars/Olympus_Mons".to_string(),
        });
        assert_eq!(
            TimeValue::from_ics(dpt),
            Err(CalViewError::ZoneResolution("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn test_resolve_tzid_accepts_globally_unique_prefix() {
        assert_eq!(resolve_tzid("/Europe/Berlin").unwrap(), Berlin);
    }

    #[test]
    fn test_to_ics_forms() {
        let (params, value) = TimeValue::Date(NaiveDate::from_ymd_opt(2014, 4, 9).unwrap()).to_ics();
        assert_eq!(params, vec![("VALUE".to_string(), "DATE".to_string())]);
        assert_eq!(value, "20140409");

        let (params, value) = TimeValue::Floating(naive(2014, 4, 9, 9, 30)).to_ics();
        assert!(params.is_empty());
        assert_eq!(value, "20140409T093000");

        let utc = Tz::UTC.with_ymd_and_hms(2014, 4, 9, 7, 30, 0).unwrap();
        let (params, value) = TimeValue::Zoned(utc).to_ics();
        assert!(params.is_empty());
        assert_eq!(value, "20140409T073000Z");

        let berlin = Berlin.with_ymd_and_hms(2014, 4, 9, 9, 30, 0).unwrap();
        let (params, value) = TimeValue::Zoned(berlin).to_ics();
        assert_eq!(params, vec![("TZID".to_string(), "Europe/Berlin".to_string())]);
        assert_eq!(value, "20140409T093000");
    }

    #[test]
    fn test_mixed_kinds_are_not_comparable() {
        let d = TimeValue::Date(NaiveDate::from_ymd_opt(2014, 4, 9).unwrap());
        let f = TimeValue::Floating(naive(2014, 4, 9, 9, 30));
        assert_eq!(d.partial_cmp(&f), None);
        assert!(f < TimeValue::Floating(naive(2014, 4, 9, 10, 30)));
    }

    #[test]
    fn test_zoned_comparison_uses_instants() {
        let berlin = TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 16, 0, 0).unwrap());
        let new_york = TimeValue::Zoned(New_York.with_ymd_and_hms(2014, 4, 9, 10, 30, 0).unwrap());
        assert!(berlin < new_york);
    }

    #[test]
    fn test_nonexistent_local_time_uses_offset_before_gap() {
        // 02:30 does not exist in Berlin on 2014-03-30
        let dt = from_local_datetime(&Berlin, naive(2014, 3, 30, 2, 30));
        assert_eq!(dt.naive_local(), naive(2014, 3, 30, 3, 30));
    }

    #[test]
    fn test_ambiguous_local_time_picks_earliest() {
        // 02:30 happens twice in Berlin on 2014-10-26
        let dt = from_local_datetime(&Berlin, naive(2014, 10, 26, 2, 30));
        assert_eq!(dt.offset().fix().local_minus_utc(), 7200);
    }

    #[test]
    fn test_parse_stable() {
        assert_eq!(
            TimeValue::parse_stable("2014-04-09"),
            Some(TimeValue::Date(NaiveDate::from_ymd_opt(2014, 4, 9).unwrap()))
        );
        assert_eq!(
            TimeValue::parse_stable("2014-04-09T09:30"),
            Some(TimeValue::Floating(naive(2014, 4, 9, 9, 30)))
        );
        assert_eq!(
            TimeValue::parse_stable("2014-04-09T09:30:00"),
            Some(TimeValue::Floating(naive(2014, 4, 9, 9, 30)))
        );
        assert_eq!(TimeValue::parse_stable("tomorrow"), None);
    }

    #[test]
    fn test_add_duration() {
        let d = TimeValue::Date(NaiveDate::from_ymd_opt(2014, 4, 9).unwrap());
        assert_eq!(
            d + Duration::days(2),
            TimeValue::Date(NaiveDate::from_ymd_opt(2014, 4, 11).unwrap())
        );

        let z = TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 9, 30, 0).unwrap());
        assert_eq!(
            z + Duration::hours(1),
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 10, 30, 0).unwrap())
        );
    }
}
