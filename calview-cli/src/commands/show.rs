use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use calview_core::Locale;
use chrono::NaiveDate;

use crate::commands::load_event;

pub fn run(path: &Path, date: Option<NaiveDate>, locale: Arc<Locale>) -> Result<()> {
    let event = load_event(path, locale)?;
    let day = date.unwrap_or(event.day_span().first);

    println!("{}", event.relative_to(day)?);
    Ok(())
}
