//! ICS parsing using the icalendar crate's parser.

use std::sync::Arc;

use chrono::Duration;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::classify::classify;
use crate::error::{CalViewError, CalViewResult};
use crate::event::{Event, EventMeta};
use crate::ics::component::{EndEncoding, IcsSource, RawComponent, RawProperty, unescape_text};
use crate::ics::vtimezone::{embedded_zone, tzid_of};
use crate::locale::Locale;
use crate::time_value::{TimeValue, from_local_datetime, resolve_tzid};

impl Event {
    /// Parses the first VEVENT of `text` into an event.
    ///
    /// The variant follows the shape of DTSTART. The end comes from DTEND,
    /// else DTSTART + DURATION, else DTSTART itself.
    pub fn from_ics(
        text: &str,
        href: Option<&str>,
        etag: Option<&str>,
        calendar: &str,
        locale: Arc<Locale>,
    ) -> CalViewResult<Event> {
        let unfolded = unfold(text);
        let parsed = read_calendar(&unfolded)
            .map_err(|e| CalViewError::parse(format!("unreadable ICS text: {e}")))?;

        let vevent_index = parsed
            .components
            .iter()
            .position(|c| c.name == "VEVENT")
            .ok_or_else(|| CalViewError::parse("no VEVENT component"))?;
        let vevent = &parsed.components[vevent_index];

        let uid = required_prop(vevent, "UID")?.val.to_string();
        let summary = unescape_text(required_prop(vevent, "SUMMARY")?.val.as_ref());

        let timezones: Vec<RawComponent> = parsed
            .components
            .iter()
            .filter(|c| c.name == "VTIMEZONE")
            .map(RawComponent::from)
            .collect();

        let start = parse_time(required_prop(vevent, "DTSTART")?, &timezones)?;
        let (end, encoding) = match (vevent.find_prop("DTEND"), vevent.find_prop("DURATION")) {
            (Some(_), Some(_)) => {
                return Err(CalViewError::parse("DTEND and DURATION are mutually exclusive"));
            }
            (Some(dtend), None) => (parse_time(dtend, &timezones)?, EndEncoding::Explicit),
            (None, Some(duration)) => {
                let raw = duration.val.to_string();
                (add_duration(start, &raw)?, EndEncoding::Duration(raw))
            }
            (None, None) => (start, EndEncoding::Implicit),
        };

        let source = IcsSource {
            calendar_properties: parsed.properties.iter().map(RawProperty::from).collect(),
            event_properties: vevent.properties.iter().map(RawProperty::from).collect(),
            event_components: vevent.components.iter().map(RawComponent::from).collect(),
            timezones,
            other_components: parsed
                .components
                .iter()
                .enumerate()
                .filter(|(i, c)| *i != vevent_index && c.name != "VTIMEZONE")
                .map(|(_, c)| RawComponent::from(c))
                .collect(),
            end: encoding,
            retimed: false,
        };

        let meta = EventMeta {
            uid,
            summary,
            recurrence: recurrence_text(vevent),
            calendar: calendar.to_string(),
            href: href.map(str::to_string),
            etag: etag.map(str::to_string),
            locale,
            source,
        };

        tracing::debug!(uid = %meta.uid, %start, %end, "parsed VEVENT");
        classify(start, end, meta).map_err(|e| CalViewError::parse(e.to_string()))
    }
}

fn required_prop<'a>(vevent: &'a Component<'a>, name: &str) -> CalViewResult<&'a Property<'a>> {
    vevent
        .find_prop(name)
        .ok_or_else(|| CalViewError::parse(format!("VEVENT has no {name}")))
}

/// Converts a DTSTART/DTEND. A TZID unknown to chrono-tz is looked up in the
/// embedded VTIMEZONEs, which may name the zone in X-LIC-LOCATION.
fn parse_time(prop: &Property, timezones: &[RawComponent]) -> CalViewResult<TimeValue> {
    let dpt = DatePerhapsTime::try_from(prop).map_err(|_| {
        CalViewError::parse(format!("malformed {} value '{}'", prop.name, prop.val))
    })?;

    if let DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) = &dpt {
        if resolve_tzid(tzid).is_err() {
            let tzid = tzid.trim_matches('"');
            let embedded = timezones
                .iter()
                .find(|c| tzid_of(c) == Some(tzid))
                .and_then(embedded_zone);
            if let Some(tz) = embedded {
                tracing::debug!(tzid, zone = tz.name(), "TZID resolved through VTIMEZONE");
                return Ok(TimeValue::Zoned(from_local_datetime(&tz, *date_time)));
            }
        }
    }

    TimeValue::from_ics(dpt)
}

/// RRULE value, or `RDATE:<values>` when the event only has RDATEs.
fn recurrence_text(vevent: &Component) -> Option<String> {
    if let Some(rrule) = vevent.find_prop("RRULE") {
        return Some(rrule.val.to_string());
    }

    let rdates: Vec<&str> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "RDATE")
        .map(|p| p.val.as_ref())
        .collect();
    if rdates.is_empty() {
        None
    } else {
        Some(format!("RDATE:{}", rdates.join(",")))
    }
}

/// Adds an ICS DURATION to `start`.
///
/// The day and week part is nominal: on a zoned start it keeps the wall-clock
/// time across DST changes. Hours, minutes and seconds are exact, so `PT24H`
/// and `P1D` differ on the day of a DST change.
fn add_duration(start: TimeValue, raw: &str) -> CalViewResult<TimeValue> {
    let value = raw.trim();
    if value.starts_with('-') {
        return Err(CalViewError::parse(format!("negative DURATION '{raw}'")));
    }

    let parsed = iso8601::duration(value.trim_start_matches('+'))
        .map_err(|e| CalViewError::parse(format!("malformed DURATION '{raw}': {e}")))?;
    let (days, exact) = split_duration(parsed, raw)?;

    match start {
        TimeValue::Date(_) if exact != Duration::zero() => Err(CalViewError::parse(format!(
            "DURATION '{raw}' on an all-day event is not a whole number of days"
        ))),
        TimeValue::Date(d) => Ok(TimeValue::Date(d + days)),
        TimeValue::Floating(dt) => Ok(TimeValue::Floating(dt + days + exact)),
        TimeValue::Zoned(dt) if days == Duration::zero() => Ok(TimeValue::Zoned(dt + exact)),
        TimeValue::Zoned(dt) => {
            let local = dt.naive_local() + days;
            Ok(TimeValue::Zoned(from_local_datetime(&dt.timezone(), local) + exact))
        }
    }
}

/// Splits a DURATION into its nominal part (weeks and days) and its exact part
/// (hours, minutes and seconds).
fn split_duration(parsed: iso8601::Duration, raw: &str) -> CalViewResult<(Duration, Duration)> {
    match parsed {
        iso8601::Duration::Weeks(weeks) => Ok((Duration::weeks(i64::from(weeks)), Duration::zero())),
        iso8601::Duration::YMDHMS {
            year: 0,
            month: 0,
            day,
            hour,
            minute,
            second,
            millisecond,
        } => Ok((
            Duration::days(i64::from(day)),
            Duration::hours(i64::from(hour))
                + Duration::minutes(i64::from(minute))
                + Duration::seconds(i64::from(second))
                + Duration::milliseconds(i64::from(millisecond)),
        )),
        iso8601::Duration::YMDHMS { .. } => Err(CalViewError::parse(format!(
            "DURATION '{raw}' uses years or months"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::{America::New_York, Europe::Berlin, Tz};

    fn locale() -> Arc<Locale> {
        Arc::new(Locale::with_timezone(Berlin))
    }

    fn parse(ics: &str) -> CalViewResult<Event> {
        Event::from_ics(ics, Some("event.ics"), Some("\"etag-1\""), "home", locale())
    }

    fn wrap(vevent_body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\nBEGIN:VEVENT\r\n{vevent_body}END:VEVENT\r\nEND:VCALENDAR\r\n"
        )
    }

    #[test]
    fn test_date_start_is_all_day() {
        let ics = wrap(
            "UID:V042MJ8B3SJNFXQOJL6P53OFMHJE8Z3VZWOU\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n\
DTEND;VALUE=DATE:20140410\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(event.kind(), EventKind::AllDay);
        assert_eq!(event.uid(), "V042MJ8B3SJNFXQOJL6P53OFMHJE8Z3VZWOU");
        assert_eq!(event.summary(), "An Event");
        assert_eq!(event.href(), Some("event.ics"));
        assert_eq!(event.etag(), Some("\"etag-1\""));
        assert_eq!(event.calendar(), "home");
        assert!(!event.recurring());
    }

    #[test]
    fn test_tzid_start_is_localized() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Europe/Berlin:20140409T093000\r\n\
DTEND;TZID=America/New_York:20140409T103000\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(event.kind(), EventKind::Localized);
        assert_eq!(
            event.start(),
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 9, 30, 0).unwrap())
        );
        assert_eq!(
            event.end(),
            TimeValue::Zoned(New_York.with_ymd_and_hms(2014, 4, 9, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_utc_start_is_localized_in_utc() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART:20140409T073000Z\r\n\
DTEND:20140409T083000Z\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(event.kind(), EventKind::Localized);
        assert_eq!(event.start().timezone(), Some(Tz::UTC));
    }

    #[test]
    fn test_naive_start_is_floating() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART:20140409T093000\r\n\
DTEND:20140409T103000\r\n",
        );
        assert_eq!(parse(&ics).unwrap().kind(), EventKind::Floating);
    }

    #[test]
    fn test_duration_gives_end() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Europe/Berlin:20140409T093000\r\n\
DURATION:PT1H30M\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(
            event.end(),
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 4, 9, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_day_duration_keeps_wall_time_across_dst() {
        // Berlin switches to summer time on 2014-03-30
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Europe/Berlin:20140329T093000\r\n\
DURATION:P1D\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(
            event.end(),
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 3, 30, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_hour_duration_is_exact_across_dst() {
        // 24 hours after 09:30 CET on 2014-03-29 is 10:30 CEST
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Europe/Berlin:20140329T093000\r\n\
DURATION:PT24H\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(
            event.end(),
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 3, 30, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_mixed_duration_adds_days_then_hours() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Europe/Berlin:20140329T093000\r\n\
DURATION:P1DT2H\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(
            event.end(),
            TimeValue::Zoned(Berlin.with_ymd_and_hms(2014, 3, 30, 11, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_all_day_duration_must_be_whole_days() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n\
DURATION:PT5H\r\n",
        );
        assert!(matches!(parse(&ics), Err(CalViewError::Parse(_))));

        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n\
DURATION:PT24H\r\n",
        );
        assert!(matches!(parse(&ics), Err(CalViewError::Parse(_))));

        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n\
DURATION:P3D\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(
            event.end(),
            TimeValue::Date(NaiveDate::from_ymd_opt(2014, 4, 12).unwrap())
        );
    }

    #[test]
    fn test_missing_end_means_zero_length() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n",
        );
        let event = parse(&ics).unwrap();
        assert_eq!(event.start(), event.end());
    }

    #[test]
    fn test_rrule_and_rdate_set_recurrence() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Europe/Berlin:20140409T093000\r\n\
DTEND;TZID=Europe/Berlin:20140409T103000\r\n\
RRULE:FREQ=DAILY;COUNT=10\r\n",
        );
        let event = parse(&ics).unwrap();
        assert!(event.recurring());
        assert_eq!(event.recurrence_rule(), Some("FREQ=DAILY;COUNT=10"));

        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n\
RDATE;VALUE=DATE:20140416\r\n\
RDATE;VALUE=DATE:20140423\r\n",
        );
        let event = parse(&ics).unwrap();
        assert!(event.recurring());
        assert_eq!(event.recurrence_rule(), Some("RDATE:20140416,20140423"));
    }

    #[test]
    fn test_summary_is_unescaped() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:Lunch\\, then coffee\r\n\
DTSTART;VALUE=DATE:20140409\r\n",
        );
        assert_eq!(parse(&ics).unwrap().summary(), "Lunch, then coffee");
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("no start", "UID:abc\r\nSUMMARY:An Event\r\n"),
            ("no uid", "SUMMARY:An Event\r\nDTSTART;VALUE=DATE:20140409\r\n"),
            ("no summary", "UID:abc\r\nDTSTART;VALUE=DATE:20140409\r\n"),
            (
                "malformed start",
                "UID:abc\r\nSUMMARY:An Event\r\nDTSTART:tomorrow\r\n",
            ),
            (
                "end before start",
                "UID:abc\r\nSUMMARY:An Event\r\nDTSTART;VALUE=DATE:20140409\r\nDTEND;VALUE=DATE:20140408\r\n",
            ),
            (
                "mixed kinds",
                "UID:abc\r\nSUMMARY:An Event\r\nDTSTART;VALUE=DATE:20140409\r\nDTEND:20140409T100000\r\n",
            ),
            (
                "end and duration",
                "UID:abc\r\nSUMMARY:An Event\r\nDTSTART:20140409T090000\r\nDTEND:20140409T100000\r\nDURATION:PT1H\r\n",
            ),
            (
                "negative duration",
                "UID:abc\r\nSUMMARY:An Event\r\nDTSTART:20140409T090000\r\nDURATION:-PT1H\r\n",
            ),
        ];
        for (name, body) in cases {
            let result = parse(&wrap(body));
            assert!(
                matches!(result, Err(CalViewError::Parse(_))),
                "{name}: expected a parse error, got {result:?}"
            );
        }
    }

    #[test]
    fn test_missing_vevent_is_a_parse_error() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        assert!(matches!(parse(ics), Err(CalViewError::Parse(_))));
    }

    #[test]
    fn test_unknown_tzid_is_a_zone_error() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;TZID=Mars/Olympus_Mons:20140409T093000\r\n",
        );
        assert_eq!(
            parse(&ics).unwrap_err(),
            CalViewError::ZoneResolution("Mars/Olympus_Mons".to_string())
        );
    }

    #[test]
    fn test_unmodelled_content_is_captured() {
        let ics = wrap(
            "UID:abc\r\n\
SUMMARY:An Event\r\n\
DTSTART;VALUE=DATE:20140409\r\n\
LOCATION:Home\r\n\
X-CUSTOM;X-PARAM=1:value\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n",
        );
        let event = parse(&ics).unwrap();
        let source = &event.meta().source;
        assert_eq!(source.end, EndEncoding::Implicit);
        assert_eq!(source.event_components.len(), 1);
        assert_eq!(source.event_components[0].name, "VALARM");
        let custom = source
            .event_properties
            .iter()
            .find(|p| p.is("X-CUSTOM"))
            .unwrap();
        assert_eq!(custom.param("X-PARAM"), Some("1"));
        assert_eq!(custom.value, "value");
        assert!(source.calendar_properties.iter().any(|p| p.is("PRODID")));
    }
}
