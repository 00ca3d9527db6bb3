//! Colored terminal rendering for calview-core types.

use calview_core::{EventKind, format_date};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventKind {
    fn render(&self) -> String {
        let tag = format!("[{self}]");
        match self {
            EventKind::AllDay => tag.green().to_string(),
            EventKind::Floating => tag.yellow().to_string(),
            EventKind::Localized => tag.cyan().to_string(),
        }
    }
}

/// One line of the week view: the day, then the label or a dimmed dot.
pub fn render_day(day: NaiveDate, dateformat: &str, label: Option<&str>) -> String {
    let header = format!("{} {}", day.format("%a"), format_date(day, dateformat));
    match label {
        Some(label) => format!("{}  {}", header.bold(), label),
        None => format!("{}  {}", header.dimmed(), "·".dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_day_survives_time_fields_in_dateformat() {
        let day = NaiveDate::from_ymd_opt(2014, 4, 9).unwrap();
        assert!(render_day(day, "%d.%m.", Some("An Event")).contains("Wed 09.04."));
        assert!(render_day(day, "%d.%m. %H:%M", None).contains("Wed 2014-04-09"));
    }
}
