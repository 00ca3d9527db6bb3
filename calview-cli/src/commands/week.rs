use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use calview_core::{Locale, week_of};
use chrono::NaiveDate;

use crate::commands::load_event;
use crate::render::render_day;

pub fn run(path: &Path, date: Option<NaiveDate>, locale: Arc<Locale>) -> Result<()> {
    let firstweekday = locale.firstweekday;
    let dateformat = locale.dateformat.clone();
    let event = load_event(path, locale)?;
    let span = event.day_span();

    for day in week_of(date.unwrap_or(span.first), firstweekday) {
        let label = if span.contains(day) {
            Some(event.relative_to(day)?)
        } else {
            None
        };
        println!("{}", render_day(day, &dateformat, label.as_deref()));
    }
    Ok(())
}
