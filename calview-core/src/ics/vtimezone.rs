//! VTIMEZONE synthesis from the chrono-tz database.
//!
//! The observances cover the lifetime of one event: the transition in effect
//! at its start, every transition up to its end and the first one after it.

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz, TzOffset};

use crate::ics::component::{RawComponent, RawProperty};
use crate::time_value::{ICS_FORMAT_DATETIME, resolve_tzid};

/// DTSTART of an observance that has always been in effect.
const BEGINNING_OF_TIME: &str = "16010101T000000";

/// How far around the event to look for transitions.
const SCAN_MARGIN_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Eq)]
struct OffsetInfo {
    utc_offset: i32,
    dst: bool,
    abbreviation: String,
}

impl From<TzOffset> for OffsetInfo {
    fn from(offset: TzOffset) -> Self {
        OffsetInfo {
            utc_offset: offset.fix().local_minus_utc(),
            dst: offset.dst_offset() != Duration::zero(),
            abbreviation: offset.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Transition {
    /// First UTC instant of the new offset.
    at: NaiveDateTime,
    from: OffsetInfo,
    to: OffsetInfo,
}

/// Builds a VTIMEZONE for `tz` that is valid between `first` and `last`.
pub(crate) fn synthesize(tz: Tz, first: DateTime<Utc>, last: DateTime<Utc>) -> RawComponent {
    let first = first.naive_utc();
    let last = last.naive_utc();
    let transitions = find_transitions(
        tz,
        first - Duration::days(SCAN_MARGIN_DAYS),
        last + Duration::days(SCAN_MARGIN_DAYS),
    );

    let mut vtimezone = RawComponent::new("VTIMEZONE");
    vtimezone.push(RawProperty::new("TZID", tz.name()));

    if transitions.is_empty() {
        let offset = offset_at(tz, first);
        let mut only = observance(&offset, BEGINNING_OF_TIME.to_string(), &offset);
        only.push(RawProperty::new("RDATE", BEGINNING_OF_TIME));
        vtimezone.components.push(only);
        return vtimezone;
    }

    let in_effect = transitions.iter().rposition(|t| t.at <= first);
    let after_last = transitions.iter().position(|t| t.at > last);

    let from = match in_effect {
        Some(index) => index,
        None => {
            let offset = offset_at(tz, first);
            vtimezone
                .components
                .push(observance(&offset, BEGINNING_OF_TIME.to_string(), &offset));
            0
        }
    };
    let to = after_last.unwrap_or(transitions.len() - 1);

    for transition in transitions.iter().take(to + 1).skip(from) {
        let local_start = transition.at + Duration::seconds(i64::from(transition.from.utc_offset));
        vtimezone.components.push(observance(
            &transition.from,
            local_start.format(ICS_FORMAT_DATETIME).to_string(),
            &transition.to,
        ));
    }

    tracing::trace!(
        tz = tz.name(),
        observances = vtimezone.components.len(),
        "synthesized VTIMEZONE"
    );
    vtimezone
}

pub(crate) fn tzid_of(component: &RawComponent) -> Option<&str> {
    component.find_prop("TZID").map(|p| p.value.as_str())
}

/// The zone a VTIMEZONE stands for: its TZID when chrono-tz knows it, else
/// its X-LIC-LOCATION (`/mozilla.org/…/Europe/Berlin` style TZIDs).
pub(crate) fn embedded_zone(component: &RawComponent) -> Option<Tz> {
    let tzid = tzid_of(component)?;
    resolve_tzid(tzid).ok().or_else(|| {
        component
            .find_prop("X-LIC-LOCATION")
            .and_then(|location| resolve_tzid(&location.value).ok())
    })
}

fn observance(from: &OffsetInfo, dtstart: String, to: &OffsetInfo) -> RawComponent {
    let mut component = RawComponent::new(if to.dst { "DAYLIGHT" } else { "STANDARD" });
    component.push(RawProperty::new("DTSTART", dtstart));
    component.push(RawProperty::new("TZNAME", to.abbreviation.clone()));
    component.push(RawProperty::new("TZOFFSETFROM", format_offset(from.utc_offset)));
    component.push(RawProperty::new("TZOFFSETTO", format_offset(to.utc_offset)));
    component
}

fn offset_at(tz: Tz, utc: NaiveDateTime) -> OffsetInfo {
    tz.offset_from_utc_datetime(&utc).into()
}

/// Walks `[from, until]` a day at a time and narrows every offset change
/// down to the second.
fn find_transitions(tz: Tz, from: NaiveDateTime, until: NaiveDateTime) -> Vec<Transition> {
    let mut transitions = Vec::new();
    let mut previous = from;
    let mut previous_offset = offset_at(tz, from);

    while previous < until {
        let next = (previous + Duration::days(1)).min(until);
        let next_offset = offset_at(tz, next);
        if next_offset != previous_offset {
            let at = bisect(tz, previous, next, &previous_offset);
            tracing::trace!(tz = tz.name(), %at, "offset transition");
            transitions.push(Transition {
                at,
                from: previous_offset,
                to: next_offset.clone(),
            });
        }
        previous = next;
        previous_offset = next_offset;
    }

    transitions
}

/// First instant in `(lo, hi]` whose offset differs from `before`.
fn bisect(tz: Tz, mut lo: NaiveDateTime, mut hi: NaiveDateTime, before: &OffsetInfo) -> NaiveDateTime {
    while hi - lo > Duration::seconds(1) {
        let mid = lo + (hi - lo) / 2;
        if offset_at(tz, mid) == *before {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

/// `+HHMM`, or `+HHMMSS` for offsets with seconds.
fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.unsigned_abs();
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if secs == 0 {
        format!("{sign}{hours:02}{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}{secs:02}")
    }
}
