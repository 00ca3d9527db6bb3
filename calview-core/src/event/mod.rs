//! Calendar events and their three time representations.
//!
//! An event is all-day, floating or localized depending on the shape of its
//! start and end. The variant is decided in one place
//! ([`classify`](crate::classify::classify)) both when parsing and when the
//! times are edited.

mod draft;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::ics::component::IcsSource;
use crate::locale::Locale;
use crate::time_value::TimeValue;

pub use draft::EventDraft;

/// Which of the three variants an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AllDay,
    Floating,
    Localized,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::AllDay => "all-day",
            EventKind::Floating => "floating",
            EventKind::Localized => "localized",
        };
        f.write_str(name)
    }
}

/// Data shared by every variant.
#[derive(Debug, Clone)]
pub struct EventMeta {
    pub(crate) uid: String,
    /// Display text, unescaped.
    pub(crate) summary: String,
    /// RRULE value (or `RDATE:<values>` for RDATE-only events).
    pub(crate) recurrence: Option<String>,
    pub(crate) calendar: String,
    pub(crate) href: Option<String>,
    pub(crate) etag: Option<String>,
    pub(crate) locale: Arc<Locale>,
    pub(crate) source: IcsSource,
}

/// An event that lasts whole days. `end` is the DTEND date, which is exclusive
/// unless it equals `start`.
#[derive(Debug, Clone)]
pub struct AllDayEvent {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) meta: EventMeta,
}

impl AllDayEvent {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// An event in wall-clock time, shown as-is whatever the local zone.
#[derive(Debug, Clone)]
pub struct FloatingEvent {
    pub(crate) start: NaiveDateTime,
    pub(crate) end: NaiveDateTime,
    pub(crate) meta: EventMeta,
}

impl FloatingEvent {
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// An event anchored to one zone, or two (start and end may differ).
#[derive(Debug, Clone)]
pub struct LocalizedEvent {
    pub(crate) start: DateTime<Tz>,
    pub(crate) end: DateTime<Tz>,
    pub(crate) meta: EventMeta,
}

impl LocalizedEvent {
    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    /// Start converted to the locale's display zone.
    pub fn start_local(&self) -> DateTime<Tz> {
        self.start.with_timezone(&self.meta.locale.local_timezone)
    }

    /// End converted to the locale's display zone.
    pub fn end_local(&self) -> DateTime<Tz> {
        self.end.with_timezone(&self.meta.locale.local_timezone)
    }
}

/// A calendar event.
#[derive(Debug, Clone)]
pub enum Event {
    AllDay(AllDayEvent),
    Floating(FloatingEvent),
    Localized(LocalizedEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AllDay(_) => EventKind::AllDay,
            Event::Floating(_) => EventKind::Floating,
            Event::Localized(_) => EventKind::Localized,
        }
    }

    pub(crate) fn meta(&self) -> &EventMeta {
        match self {
            Event::AllDay(e) => &e.meta,
            Event::Floating(e) => &e.meta,
            Event::Localized(e) => &e.meta,
        }
    }

    pub fn uid(&self) -> &str {
        &self.meta().uid
    }

    pub fn summary(&self) -> &str {
        &self.meta().summary
    }

    pub fn start(&self) -> TimeValue {
        match self {
            Event::AllDay(e) => TimeValue::Date(e.start),
            Event::Floating(e) => TimeValue::Floating(e.start),
            Event::Localized(e) => TimeValue::Zoned(e.start),
        }
    }

    pub fn end(&self) -> TimeValue {
        match self {
            Event::AllDay(e) => TimeValue::Date(e.end),
            Event::Floating(e) => TimeValue::Floating(e.end),
            Event::Localized(e) => TimeValue::Zoned(e.end),
        }
    }

    /// Whether the event has a time of day (anything but all-day).
    pub fn is_timed(&self) -> bool {
        !matches!(self, Event::AllDay(_))
    }

    /// Whether the event has an RRULE or RDATE. Occurrences are never expanded.
    pub fn recurring(&self) -> bool {
        self.meta().recurrence.is_some()
    }

    /// The recurrence rule as written in the source.
    pub fn recurrence_rule(&self) -> Option<&str> {
        self.meta().recurrence.as_deref()
    }

    pub fn calendar(&self) -> &str {
        &self.meta().calendar
    }

    pub fn href(&self) -> Option<&str> {
        self.meta().href.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.meta().etag.as_deref()
    }

    pub fn locale(&self) -> &Locale {
        &self.meta().locale
    }

    /// The unmodelled parts of the ICS text the event came from.
    pub fn source(&self) -> &IcsSource {
        &self.meta().source
    }

    /// Start and end as wall-clock times in the display zone. `None` for all-day events.
    pub fn local_times(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match self {
            Event::AllDay(_) => None,
            Event::Floating(e) => Some((e.start, e.end)),
            Event::Localized(e) => Some((e.start_local().naive_local(), e.end_local().naive_local())),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.summary(), self.start(), self.end())
    }
}
