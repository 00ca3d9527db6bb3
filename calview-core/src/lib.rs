//! Core types for calview.
//!
//! This crate parses single calendar events from ICS text, classifies them by
//! how their times are expressed, and renders them back:
//! - `Event` and its variants (`AllDayEvent`, `FloatingEvent`, `LocalizedEvent`)
//! - `ics` for parsing, serialization and normalization
//! - `relative` for the short and long labels shown to users
//! - `locale` for the display settings every event carries

pub mod classify;
pub mod day_span;
pub mod error;
pub mod event;
pub mod ics;
pub mod locale;
pub mod relative;
pub mod time_value;

pub use classify::ClassifyError;
pub use day_span::{DayPosition, DaySpan, week_of};
pub use error::{CalViewError, CalViewResult};
pub use event::{AllDayEvent, Event, EventDraft, EventKind, EventMeta, FloatingEvent, LocalizedEvent};
pub use ics::normalize;
pub use locale::{Locale, LocaleConfig};
pub use relative::{Symbols, format_date};
pub use time_value::{TimeKind, TimeValue, resolve_tzid};
