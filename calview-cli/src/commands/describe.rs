use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use calview_core::Locale;
use owo_colors::OwoColorize;

use crate::commands::load_event;
use crate::render::Render;

pub fn run(path: &Path, locale: Arc<Locale>) -> Result<()> {
    let event = load_event(path, locale)?;

    println!("{}", event.description());
    println!("{} {}", event.kind().render(), event.uid().dimmed());
    Ok(())
}
