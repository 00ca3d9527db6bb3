use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use calview_core::{Locale, TimeValue, resolve_tzid};

use crate::commands::load_event;

pub fn run(path: &Path, start: &str, end: &str, tz: Option<&str>, locale: Arc<Locale>) -> Result<()> {
    let event = load_event(path, locale)?;

    let tz = tz.map(resolve_tzid).transpose()?;
    let parse = |value: &str| -> Result<TimeValue> {
        let parsed = TimeValue::parse_stable(value)
            .ok_or_else(|| anyhow!("Invalid time '{value}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"))?;
        Ok(match tz {
            Some(tz) => parsed.anchored_in(&tz),
            None => parsed,
        })
    };

    let moved = event
        .update_start_end(parse(start)?, parse(end)?)
        .context("Failed to move event")?;
    tracing::debug!(from = %event.kind(), to = %moved.kind(), "moved event");

    print!("{}", moved.raw());
    Ok(())
}
