//! Owned copies of parsed ICS components.
//!
//! An event keeps the text it was built from so that serializing it again
//! loses nothing: properties calview does not interpret are carried through
//! verbatim, in their original order.

use icalendar::parser;

/// One content line: `NAME;PARAM=VALUE:value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub name: String,
    pub params: Vec<(String, Option<String>)>,
    /// The value exactly as written (TEXT values stay escaped).
    pub value: String,
}

impl RawProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        RawProperty {
            name: name.into(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), Some(value.into())));
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_deref())
    }

    pub(crate) fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl From<&parser::Property<'_>> for RawProperty {
    fn from(prop: &parser::Property<'_>) -> Self {
        RawProperty {
            name: prop.name.to_string(),
            params: prop
                .params
                .iter()
                .map(|p| (p.key.to_string(), p.val.as_ref().map(|v| v.to_string())))
                .collect(),
            value: prop.val.to_string(),
        }
    }
}

/// A `BEGIN:NAME` … `END:NAME` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComponent {
    pub name: String,
    pub properties: Vec<RawProperty>,
    pub components: Vec<RawComponent>,
}

impl RawComponent {
    pub fn new(name: impl Into<String>) -> Self {
        RawComponent {
            name: name.into(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn find_prop(&self, name: &str) -> Option<&RawProperty> {
        self.properties.iter().find(|p| p.is(name))
    }

    pub(crate) fn push(&mut self, prop: RawProperty) {
        self.properties.push(prop);
    }
}

impl From<&parser::Component<'_>> for RawComponent {
    fn from(component: &parser::Component<'_>) -> Self {
        RawComponent {
            name: component.name.to_string(),
            properties: component.properties.iter().map(RawProperty::from).collect(),
            components: component.components.iter().map(RawComponent::from).collect(),
        }
    }
}

/// How the end of the event was (or will be) written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndEncoding {
    /// A DTEND property.
    Explicit,
    /// A DURATION property, kept as written.
    Duration(String),
    /// Neither; the end equals the start.
    Implicit,
}

/// Everything of the source text that is not modelled by the event itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsSource {
    /// Calendar-level properties (VERSION, PRODID, …).
    pub calendar_properties: Vec<RawProperty>,
    /// All VEVENT properties in order. DTSTART/DTEND/DURATION mark where the
    /// current start and end get written.
    pub event_properties: Vec<RawProperty>,
    /// Components nested in the VEVENT (VALARM, …).
    pub event_components: Vec<RawComponent>,
    /// VTIMEZONE blocks that came with the source.
    pub timezones: Vec<RawComponent>,
    /// Further calendar components (more VEVENTs, VTODOs, …), carried through
    /// unparsed.
    pub other_components: Vec<RawComponent>,
    pub end: EndEncoding,
    /// Set once the start or end was changed after parsing. Embedded
    /// VTIMEZONEs may no longer cover the event and are re-synthesized.
    pub retimed: bool,
}

/// Escape a TEXT value (RFC 5545 §3.3.11).
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Undo [`escape_text`].
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
