//! Display locale: the zones and format templates used to render events.
//!
//! `LocaleConfig` is what gets deserialized from the config file and the
//! environment. It is validated once into a `Locale`, which is all the rest of
//! the crate ever sees.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{CalViewError, CalViewResult};
use crate::relative::try_format;
use crate::time_value::resolve_tzid;

static ENV_PREFIX: &str = "CALVIEW";

/// Raw locale settings, as read from `~/.config/calview/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Zone used for new events that are not given one.
    pub default_timezone: String,

    /// Zone events are displayed in.
    pub local_timezone: String,

    pub timeformat: String,
    pub dateformat: String,
    pub longdateformat: String,
    pub datetimeformat: String,
    pub longdatetimeformat: String,

    /// Use arrows and other glyphs instead of ASCII markers.
    pub unicode_symbols: bool,

    /// First day of the week, 0 = Monday.
    pub firstweekday: u8,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        LocaleConfig {
            default_timezone: "UTC".to_string(),
            local_timezone: "UTC".to_string(),
            timeformat: "%H:%M".to_string(),
            dateformat: "%d.%m.".to_string(),
            longdateformat: "%d.%m.%Y".to_string(),
            datetimeformat: "%d.%m. %H:%M".to_string(),
            longdatetimeformat: "%d.%m.%Y %H:%M".to_string(),
            unicode_symbols: true,
            firstweekday: 0,
        }
    }
}

impl LocaleConfig {
    /// `<config dir>/calview/config.toml`
    pub fn default_path() -> CalViewResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalViewError::Config("Could not determine config directory".into()))?
            .join("calview");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from an optional config file, overridden by `CALVIEW_*`
    /// environment variables. Missing keys keep their defaults.
    pub fn load(path: Option<&Path>) -> CalViewResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading locale configuration");
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize::<LocaleConfig>())
            .map_err(|e| CalViewError::Config(e.to_string()))
    }
}

/// Validated, read-only locale bundle shared by all events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub default_timezone: Tz,
    pub local_timezone: Tz,
    pub timeformat: String,
    pub dateformat: String,
    pub longdateformat: String,
    pub datetimeformat: String,
    pub longdatetimeformat: String,
    pub unicode_symbols: bool,
    pub firstweekday: Weekday,
}

impl Default for Locale {
    fn default() -> Self {
        let raw = LocaleConfig::default();
        Locale {
            default_timezone: Tz::UTC,
            local_timezone: Tz::UTC,
            timeformat: raw.timeformat,
            dateformat: raw.dateformat,
            longdateformat: raw.longdateformat,
            datetimeformat: raw.datetimeformat,
            longdatetimeformat: raw.longdatetimeformat,
            unicode_symbols: raw.unicode_symbols,
            firstweekday: Weekday::Mon,
        }
    }
}

impl Locale {
    /// A locale that displays in `tz` and assigns `tz` to new events.
    pub fn with_timezone(tz: Tz) -> Self {
        Locale {
            default_timezone: tz,
            local_timezone: tz,
            ..Locale::default()
        }
    }
}

impl TryFrom<LocaleConfig> for Locale {
    type Error = CalViewError;

    fn try_from(raw: LocaleConfig) -> CalViewResult<Self> {
        let default_timezone = resolve_tzid(&raw.default_timezone)?;
        let local_timezone = resolve_tzid(&raw.local_timezone)?;

        // each template must render the kind of value it is given
        let sample_date = NaiveDate::default();
        let sample_time = local_timezone.from_utc_datetime(&NaiveDateTime::default());
        for (name, template) in [
            ("dateformat", &raw.dateformat),
            ("longdateformat", &raw.longdateformat),
        ] {
            validate_template(name, template, sample_date.format(template))?;
        }
        for (name, template) in [
            ("timeformat", &raw.timeformat),
            ("datetimeformat", &raw.datetimeformat),
            ("longdatetimeformat", &raw.longdatetimeformat),
        ] {
            validate_template(name, template, sample_time.format(template))?;
        }

        let firstweekday = Weekday::try_from(raw.firstweekday).map_err(|_| {
            CalViewError::Config(format!(
                "firstweekday must be between 0 and 6, got {}",
                raw.firstweekday
            ))
        })?;

        Ok(Locale {
            default_timezone,
            local_timezone,
            timeformat: raw.timeformat,
            dateformat: raw.dateformat,
            longdateformat: raw.longdateformat,
            datetimeformat: raw.datetimeformat,
            longdatetimeformat: raw.longdatetimeformat,
            unicode_symbols: raw.unicode_symbols,
            firstweekday,
        })
    }
}

fn validate_template(name: &str, template: &str, sample: impl fmt::Display) -> CalViewResult<()> {
    if try_format(sample).is_none() {
        return Err(CalViewError::Config(format!(
            "{name} is not a valid strftime template for its value: '{template}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;
    use std::io::Write;

    #[test]
    fn test_default_config_validates() {
        let locale = Locale::try_from(LocaleConfig::default()).unwrap();
        assert_eq!(locale, Locale::default());
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        let raw = LocaleConfig {
            local_timezone: "Europe/Atlantis".to_string(),
            ..LocaleConfig::default()
        };
        assert_eq!(
            Locale::try_from(raw),
            Err(CalViewError::ZoneResolution("Europe/Atlantis".to_string()))
        );
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let raw = LocaleConfig {
            timeformat: "%H:%!".to_string(),
            ..LocaleConfig::default()
        };
        let err = Locale::try_from(raw).unwrap_err();
        assert!(
            matches!(err, CalViewError::Config(ref msg) if msg.contains("timeformat")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_date_template_with_time_fields_is_rejected() {
        for dateformat in ["%d.%m. %H:%M", "%a %Z"] {
            let raw = LocaleConfig {
                dateformat: dateformat.to_string(),
                ..LocaleConfig::default()
            };
            let err = Locale::try_from(raw).unwrap_err();
            assert!(
                matches!(err, CalViewError::Config(ref msg) if msg.contains("dateformat")),
                "unexpected error for {dateformat}: {err}"
            );
        }
    }

    #[test]
    fn test_zone_fields_are_allowed_in_time_templates() {
        let raw = LocaleConfig {
            local_timezone: "Europe/Berlin".to_string(),
            timeformat: "%H:%M %Z".to_string(),
            longdatetimeformat: "%d.%m.%Y %H:%M %z".to_string(),
            ..LocaleConfig::default()
        };
        let locale = Locale::try_from(raw).unwrap();
        assert_eq!(locale.timeformat, "%H:%M %Z");
    }

    #[test]
    fn test_firstweekday_out_of_range_is_rejected() {
        let raw = LocaleConfig {
            firstweekday: 7,
            ..LocaleConfig::default()
        };
        assert!(matches!(
            Locale::try_from(raw),
            Err(CalViewError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
local_timezone = "Europe/Berlin"
default_timezone = "Europe/Berlin"
timeformat = "%I:%M %p"
unicode_symbols = false
firstweekday = 6
"#
        )
        .unwrap();

        let raw = LocaleConfig::load(Some(file.path())).unwrap();
        assert_eq!(raw.timeformat, "%I:%M %p");
        // untouched keys keep their defaults
        assert_eq!(raw.longdateformat, "%d.%m.%Y");

        let locale = Locale::try_from(raw).unwrap();
        assert_eq!(locale.local_timezone, Berlin);
        assert!(!locale.unicode_symbols);
        assert_eq!(locale.firstweekday, Weekday::Sun);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let raw = LocaleConfig::load(Some(dir.path().join("missing.toml").as_path())).unwrap();
        assert_eq!(raw.timeformat, LocaleConfig::default().timeformat);
    }
}
