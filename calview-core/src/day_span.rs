//! Calendar days covered by an event, and where a given day falls in them.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{CalViewError, CalViewResult};
use crate::event::Event;

/// First and last local day an event covers, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// Where a reference day sits relative to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPosition {
    /// All-day event covering only this day.
    SingleDayUntimed,
    /// Timed event starting and ending on this day.
    SingleDayTimed,
    /// First day of a longer event.
    MultiDayStart,
    /// A day strictly between the first and the last.
    MultiDayMiddle,
    /// Last day of a longer event.
    MultiDayEnd,
}

impl DaySpan {
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        DaySpan { first, last }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }

    pub fn is_single_day(&self) -> bool {
        self.first == self.last
    }

    /// Every covered day, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first.iter_days().take_while(move |d| *d <= self.last)
    }

    /// The formatter state for `day`.
    ///
    /// A single-day span always wins. Otherwise the first day takes
    /// precedence over the last, then every other day is a middle day.
    pub fn position(&self, day: NaiveDate, timed: bool) -> CalViewResult<DayPosition> {
        if !self.contains(day) {
            return Err(CalViewError::range(format!(
                "{day} is outside of the event ({} - {})",
                self.first, self.last
            )));
        }

        let position = if self.is_single_day() {
            if timed {
                DayPosition::SingleDayTimed
            } else {
                DayPosition::SingleDayUntimed
            }
        } else if day == self.first {
            DayPosition::MultiDayStart
        } else if day == self.last {
            DayPosition::MultiDayEnd
        } else {
            DayPosition::MultiDayMiddle
        };
        Ok(position)
    }
}

impl Event {
    /// Local days covered by the event.
    ///
    /// Localized times are converted to the display zone first. An all-day
    /// DTEND is exclusive, except when it equals DTSTART.
    pub fn day_span(&self) -> DaySpan {
        match self {
            Event::AllDay(e) => {
                let last = (e.end - Duration::days(1)).max(e.start);
                DaySpan::new(e.start, last)
            }
            Event::Floating(e) => DaySpan::new(e.start.date(), e.end.date()),
            Event::Localized(e) => {
                DaySpan::new(e.start_local().date_naive(), e.end_local().date_naive())
            }
        }
    }
}

/// The seven days of the week containing `date`, starting on `first_day`.
pub fn week_of(date: NaiveDate, first_day: Weekday) -> [NaiveDate; 7] {
    let back = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    let back = i64::from(back);
    let start = date - Duration::days(back);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}
