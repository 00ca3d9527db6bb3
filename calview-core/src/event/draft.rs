use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::classify::classify;
use crate::error::{CalViewError, CalViewResult};
use crate::event::{Event, EventMeta};
use crate::ics::component::{EndEncoding, IcsSource, RawProperty, escape_text};
use crate::ics::generate::{PRODID, dtend_placeholder, dtstart_placeholder};
use crate::locale::Locale;
use crate::time_value::{ICS_FORMAT_DATETIME, TimeValue};

/// An event built programmatically rather than parsed from ICS text.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub summary: String,
    pub start: TimeValue,
    /// Defaults to one hour after a timed start, one day after a date.
    pub end: Option<TimeValue>,
    /// RRULE value.
    pub recurrence: Option<String>,
    /// Keep naive start/end floating instead of anchoring them in the
    /// locale's default zone.
    pub floating: bool,
}

impl EventDraft {
    pub fn new(summary: impl Into<String>, start: impl Into<TimeValue>) -> Self {
        EventDraft {
            summary: summary.into(),
            start: start.into(),
            end: None,
            recurrence: None,
            floating: false,
        }
    }

    pub fn with_end(mut self, end: impl Into<TimeValue>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn with_recurrence(mut self, rrule: impl Into<String>) -> Self {
        self.recurrence = Some(rrule.into());
        self
    }

    pub fn floating(mut self) -> Self {
        self.floating = true;
        self
    }

    /// Builds the event, generating a fresh UID.
    pub fn into_event(self, calendar: impl Into<String>, locale: Arc<Locale>) -> CalViewResult<Event> {
        let (start, end) = self.resolved_times(&locale);
        let uid = uuid::Uuid::new_v4().to_string();

        let mut event_properties = vec![
            RawProperty::new("UID", uid.clone()),
            RawProperty::new(
                "DTSTAMP",
                format!("{}Z", Utc::now().format(ICS_FORMAT_DATETIME)),
            ),
            dtstart_placeholder(),
            dtend_placeholder(),
            RawProperty::new("SUMMARY", escape_text(&self.summary)),
        ];
        if let Some(rrule) = &self.recurrence {
            event_properties.push(RawProperty::new("RRULE", rrule.clone()));
        }

        let meta = EventMeta {
            uid,
            summary: self.summary,
            recurrence: self.recurrence,
            calendar: calendar.into(),
            href: None,
            etag: None,
            locale,
            source: IcsSource {
                calendar_properties: vec![
                    RawProperty::new("VERSION", "2.0"),
                    RawProperty::new("PRODID", PRODID),
                ],
                event_properties,
                event_components: Vec::new(),
                timezones: Vec::new(),
                other_components: Vec::new(),
                end: EndEncoding::Explicit,
                retimed: false,
            },
        };

        tracing::debug!(summary = %meta.summary, %start, %end, "building event from draft");
        classify(start, end, meta).map_err(|e| CalViewError::range(e.to_string()))
    }

    fn resolved_times(&self, locale: &Locale) -> (TimeValue, TimeValue) {
        let anchor = |value: TimeValue| {
            if self.floating {
                value
            } else {
                value.anchored_in(&locale.default_timezone)
            }
        };

        let start = anchor(self.start);
        let end = match self.end {
            Some(end) => anchor(end),
            None => match start {
                TimeValue::Date(_) => start + Duration::days(1),
                _ => start + Duration::hours(1),
            },
        };
        (start, end)
    }
}
