//! Deciding an event's variant from the shape of its start and end.
//!
//! The same function is used when parsing and when an event's times are
//! edited, so both paths always agree.

use thiserror::Error;

use crate::error::{CalViewError, CalViewResult};
use crate::event::{AllDayEvent, Event, EventMeta, FloatingEvent, LocalizedEvent};
use crate::ics::component::EndEncoding;
use crate::time_value::TimeValue;

/// Why a start/end pair cannot form an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("start ({start}) and end ({end}) must both be dates, both floating or both zoned")]
    MixedKinds { start: String, end: String },

    #[error("end ({end}) is before start ({start})")]
    EndBeforeStart { start: String, end: String },
}

/// Builds the variant implied by `start` and `end`:
/// dates give an all-day event, naive date-times a floating one and zoned
/// date-times (possibly in two zones) a localized one.
pub fn classify(start: TimeValue, end: TimeValue, meta: EventMeta) -> Result<Event, ClassifyError> {
    let event = match (start, end) {
        (TimeValue::Date(start), TimeValue::Date(end)) => {
            ensure_ordered(start <= end, &start, &end)?;
            Event::AllDay(AllDayEvent { start, end, meta })
        }
        (TimeValue::Floating(start), TimeValue::Floating(end)) => {
            ensure_ordered(start <= end, &start, &end)?;
            Event::Floating(FloatingEvent { start, end, meta })
        }
        (TimeValue::Zoned(start), TimeValue::Zoned(end)) => {
            ensure_ordered(start <= end, &start, &end)?;
            Event::Localized(LocalizedEvent { start, end, meta })
        }
        (start, end) => {
            return Err(ClassifyError::MixedKinds {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    };

    tracing::debug!(uid = %event.uid(), kind = %event.kind(), "classified event");
    Ok(event)
}

fn ensure_ordered(ok: bool, start: &dyn std::fmt::Display, end: &dyn std::fmt::Display) -> Result<(), ClassifyError> {
    if ok {
        Ok(())
    } else {
        Err(ClassifyError::EndBeforeStart {
            start: start.to_string(),
            end: end.to_string(),
        })
    }
}

impl Event {
    /// Returns a copy of this event with new start and end times.
    ///
    /// The variant is re-derived from the new values, so giving an all-day
    /// event zoned times yields a localized event. Everything else (UID,
    /// summary, recurrence, provenance, unmodelled properties) carries over.
    /// The result always encodes its end as DTEND.
    pub fn update_start_end(&self, start: TimeValue, end: TimeValue) -> CalViewResult<Event> {
        let mut meta = self.meta().clone();
        meta.source.end = EndEncoding::Explicit;
        meta.source.retimed = true;

        let updated = classify(start, end, meta).map_err(|e| CalViewError::range(e.to_string()))?;
        if updated.kind() != self.kind() {
            tracing::debug!(
                uid = %self.uid(),
                from = %self.kind(),
                to = %updated.kind(),
                "event changed variant"
            );
        }
        Ok(updated)
    }
}
