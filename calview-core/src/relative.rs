//! Human-readable labels for events.
//!
//! [`Event::relative_to`] gives the short label shown on one day of a calendar
//! grid; [`Event::description`] the long one used in detail views.

use std::fmt::{self, Write};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::day_span::DayPosition;
use crate::error::CalViewResult;
use crate::event::Event;
use crate::locale::Locale;
use crate::time_value::{TimeValue, from_local_datetime};

/// Markers used in labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub right_arrow: &'static str,
    pub range_start: &'static str,
    pub range: &'static str,
    pub range_end: &'static str,
    pub recurring: &'static str,
}

impl Symbols {
    pub const UNICODE: Symbols = Symbols {
        right_arrow: "→",
        range_start: "↦",
        range: "↔",
        range_end: "⇥",
        recurring: "⟳",
    };

    pub const ASCII: Symbols = Symbols {
        right_arrow: "->",
        range_start: "|->",
        range: "<->",
        range_end: "->|",
        recurring: "R",
    };

    pub fn for_locale(locale: &Locale) -> &'static Symbols {
        if locale.unicode_symbols {
            &Self::UNICODE
        } else {
            &Self::ASCII
        }
    }
}

impl Event {
    /// Short label for the calendar day `day`.
    ///
    /// Fails with a range error when the event does not cover `day`.
    pub fn relative_to(&self, day: NaiveDate) -> CalViewResult<String> {
        let locale = self.locale();
        let symbols = Symbols::for_locale(locale);
        let summary = self.summary();
        let timed = self.is_timed();
        let (start, end) = self.wall_times();

        let mut label = match self.day_span().position(day, timed)? {
            DayPosition::SingleDayUntimed => summary.to_string(),
            DayPosition::SingleDayTimed => format!(
                "{}-{}: {summary}",
                start.format(&locale.timeformat),
                end.format(&locale.timeformat)
            ),
            DayPosition::MultiDayStart if timed => format!(
                "{}{} : {summary}",
                start.format(&locale.timeformat),
                symbols.right_arrow
            ),
            DayPosition::MultiDayStart => format!("{} {summary}", symbols.range_start),
            DayPosition::MultiDayMiddle if timed => {
                format!("{arrow} {arrow} : {summary}", arrow = symbols.right_arrow)
            }
            DayPosition::MultiDayMiddle => format!("{} {summary}", symbols.range),
            DayPosition::MultiDayEnd if timed => format!(
                "{} {}: {summary}",
                symbols.right_arrow,
                end.format(&locale.timeformat)
            ),
            DayPosition::MultiDayEnd => format!("{} {summary}", symbols.range_end),
        };

        if self.recurring() {
            label.push(' ');
            label.push_str(symbols.recurring);
        }
        Ok(label)
    }

    /// Long label, with the recurrence rule on a second line.
    pub fn description(&self) -> String {
        let locale = self.locale();
        let summary = self.summary();
        let span = self.day_span();
        let (start, end) = self.wall_times();

        let mut text = match (self.is_timed(), span.is_single_day()) {
            (false, true) => {
                format!("{}: {summary}", format_date(span.first, &locale.longdateformat))
            }
            (true, true) => format!(
                "{}-{} {}: {summary}",
                start.format(&locale.timeformat),
                end.format(&locale.timeformat),
                format_date(span.first, &locale.longdateformat)
            ),
            (false, false) => format!(
                "{} - {}: {summary}",
                format_date(span.first, &locale.longdateformat),
                format_date(span.last, &locale.longdateformat)
            ),
            (true, false) => format!(
                "{} - {}: {summary}",
                start.format(&locale.longdatetimeformat),
                end.format(&locale.longdatetimeformat)
            ),
        };

        if let Some(rule) = self.recurrence_rule() {
            text.push_str("\nRepeat: ");
            text.push_str(rule);
        }
        text
    }

    /// Start and end as shown in the display zone.
    fn wall_times(&self) -> (WallTime, WallTime) {
        let tz = self.locale().local_timezone;
        (WallTime::new(self.start(), tz), WallTime::new(self.end(), tz))
    }
}

/// A time as it appears on the viewer's clock.
#[derive(Debug, Clone, Copy)]
enum WallTime {
    /// Floating (or all-day) values, shown as written; `Tz` is the display zone.
    Floating(NaiveDateTime, Tz),
    Zoned(DateTime<Tz>),
}

impl WallTime {
    fn new(value: TimeValue, tz: Tz) -> Self {
        match value {
            TimeValue::Date(d) => WallTime::Floating(NaiveDateTime::new(d, NaiveTime::MIN), tz),
            TimeValue::Floating(naive) => WallTime::Floating(naive, tz),
            TimeValue::Zoned(dt) => WallTime::Zoned(dt.with_timezone(&tz)),
        }
    }

    /// Formats with a strftime template. Zone fields on a floating time show
    /// the display zone. Templates that cannot be rendered fall back to ISO 8601.
    fn format(&self, template: &str) -> String {
        let formatted = match self {
            WallTime::Zoned(dt) => try_format(dt.format(template)),
            WallTime::Floating(naive, tz) => try_format(naive.format(template))
                .or_else(|| try_format(from_local_datetime(tz, *naive).format(template))),
        };
        formatted.unwrap_or_else(|| {
            tracing::warn!(template, "cannot format with template, falling back to ISO 8601");
            match self {
                WallTime::Zoned(dt) => dt.naive_local().to_string(),
                WallTime::Floating(naive, _) => naive.to_string(),
            }
        })
    }
}

/// Formats a calendar day with a strftime template, falling back to ISO 8601
/// when the template needs more than a date.
pub fn format_date(date: NaiveDate, template: &str) -> String {
    try_format(date.format(template)).unwrap_or_else(|| {
        tracing::warn!(template, "cannot format date with template, falling back to ISO 8601");
        date.to_string()
    })
}

/// `None` when the value's `Display` fails, as chrono's does for fields the
/// value does not have.
pub(crate) fn try_format(value: impl fmt::Display) -> Option<String> {
    let mut out = String::new();
    write!(out, "{value}").ok()?;
    Some(out)
}
