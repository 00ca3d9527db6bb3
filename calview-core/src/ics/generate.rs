//! ICS generation.
//!
//! Output is written line by line rather than through the icalendar builder:
//! the source's properties are replayed in their original order and only
//! DTSTART/DTEND/DURATION are regenerated from the event's current times.

use chrono::Utc;
use chrono_tz::Tz;

use crate::event::Event;
use crate::ics::component::{EndEncoding, RawComponent, RawProperty};
use crate::ics::content_line::ContentLineWriter;
use crate::ics::vtimezone::{self, embedded_zone, tzid_of};
use crate::time_value::TimeValue;

pub(crate) const PRODID: &str = "-//calview//calview-core//EN";

/// Marks where DTSTART goes in a programmatically built event.
pub(crate) fn dtstart_placeholder() -> RawProperty {
    RawProperty::new("DTSTART", "")
}

/// Marks where DTEND goes in a programmatically built event.
pub(crate) fn dtend_placeholder() -> RawProperty {
    RawProperty::new("DTEND", "")
}

impl Event {
    /// Serializes the event as a complete VCALENDAR.
    ///
    /// Zoned times other than UTC come with a VTIMEZONE: the one from the
    /// source when it describes the same zone and the times were not edited,
    /// a synthesized one otherwise.
    pub fn raw(&self) -> String {
        let source = &self.meta().source;
        let timezones = self.timezones();
        let mut writer = ContentLineWriter::new();

        writer.begin("VCALENDAR");
        if !source.calendar_properties.iter().any(|p| p.is("VERSION")) {
            writer.property(&RawProperty::new("VERSION", "2.0"));
        }
        if !source.calendar_properties.iter().any(|p| p.is("PRODID")) {
            writer.property(&RawProperty::new("PRODID", PRODID));
        }
        for prop in &source.calendar_properties {
            writer.property(prop);
        }

        for timezone in &timezones {
            writer.component(timezone);
        }

        writer.begin("VEVENT");
        let has_end_slot = source
            .event_properties
            .iter()
            .any(|p| p.is("DTEND") || p.is("DURATION"));
        for prop in &source.event_properties {
            if prop.is("DTSTART") {
                writer.property(&self.time_property("DTSTART", self.start(), Some(prop), &timezones));
                if source.end == EndEncoding::Explicit && !has_end_slot {
                    writer.property(&self.time_property("DTEND", self.end(), None, &timezones));
                }
            } else if prop.is("DTEND") || prop.is("DURATION") {
                match &source.end {
                    EndEncoding::Explicit => {
                        let original = prop.is("DTEND").then_some(prop);
                        writer.property(&self.time_property("DTEND", self.end(), original, &timezones));
                    }
                    EndEncoding::Duration(_) => writer.property(prop),
                    EndEncoding::Implicit => {}
                }
            } else {
                writer.property(prop);
            }
        }
        for component in &source.event_components {
            writer.component(component);
        }
        writer.end("VEVENT");

        for component in &source.other_components {
            writer.component(component);
        }
        writer.end("VCALENDAR");

        writer.finish()
    }

    /// VTIMEZONE blocks to emit, in order of first use.
    fn timezones(&self) -> Vec<RawComponent> {
        let source = &self.meta().source;
        let mut timezones: Vec<RawComponent> = Vec::new();

        if let Event::Localized(event) = self {
            let first = event.start.with_timezone(&Utc);
            let last = event.end.with_timezone(&Utc);
            let mut zones: Vec<Tz> = Vec::new();
            for tz in [event.start.timezone(), event.end.timezone()] {
                if tz != Tz::UTC && !zones.contains(&tz) {
                    zones.push(tz);
                }
            }

            for tz in zones {
                match source_timezone(&source.timezones, tz) {
                    Some(embedded) if !source.retimed => timezones.push(embedded.clone()),
                    _ => {
                        tracing::debug!(tz = tz.name(), "synthesizing VTIMEZONE");
                        timezones.push(vtimezone::synthesize(tz, first, last));
                    }
                }
            }
        }

        // zones still referenced by other properties (EXDATE, RECURRENCE-ID, …)
        for prop in &source.event_properties {
            if prop.is("DTSTART") || prop.is("DTEND") {
                continue;
            }
            let Some(tzid) = prop.param("TZID") else {
                continue;
            };
            if timezones.iter().any(|c| tzid_of(c) == Some(tzid)) {
                continue;
            }
            if let Some(embedded) = source.timezones.iter().find(|c| tzid_of(c) == Some(tzid)) {
                timezones.push(embedded.clone());
            }
        }

        timezones
    }

    /// Renders one of the event's own times, keeping any extra parameters the
    /// original property carried.
    fn time_property(
        &self,
        name: &str,
        value: TimeValue,
        original: Option<&RawProperty>,
        timezones: &[RawComponent],
    ) -> RawProperty {
        let (params, text) = value.to_ics();
        let mut prop = RawProperty::new(name, text);

        for (key, param) in params {
            let param = match value.timezone() {
                Some(tz) if key == "TZID" => timezones
                    .iter()
                    .find(|c| embedded_zone(c) == Some(tz))
                    .and_then(tzid_of)
                    .map(str::to_string)
                    .unwrap_or(param),
                _ => param,
            };
            prop = prop.with_param(key, param);
        }

        if let Some(original) = original {
            prop.params.extend(
                original
                    .params
                    .iter()
                    .filter(|(key, _)| {
                        !key.eq_ignore_ascii_case("TZID") && !key.eq_ignore_ascii_case("VALUE")
                    })
                    .cloned(),
            );
        }
        prop
    }
}

fn source_timezone(timezones: &[RawComponent], tz: Tz) -> Option<&RawComponent> {
    timezones.iter().find(|c| embedded_zone(c) == Some(tz))
}
