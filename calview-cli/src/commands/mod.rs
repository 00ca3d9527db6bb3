pub mod describe;
pub mod raw;
pub mod reschedule;
pub mod show;
pub mod week;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use calview_core::{Event, Locale};

/// Reads and parses an .ics file. The file name is the event's href and the
/// parent directory names its calendar.
pub fn load_event(path: &Path, locale: Arc<Locale>) -> Result<Event> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let href = path.file_name().map(|name| name.to_string_lossy().into_owned());
    let calendar = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Event::from_ics(&text, href.as_deref(), None, &calendar, locale)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
