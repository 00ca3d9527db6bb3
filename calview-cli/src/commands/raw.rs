use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use calview_core::Locale;

use crate::commands::load_event;

pub fn run(path: &Path, locale: Arc<Locale>) -> Result<()> {
    let event = load_event(path, locale)?;

    print!("{}", event.raw());
    Ok(())
}
