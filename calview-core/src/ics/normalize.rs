//! Canonical form of ICS text, for comparing two serializations.
//!
//! Two texts normalize equally when they hold the same components with the
//! same properties and values, whatever their line folding, line endings,
//! property order, component order or parameter quoting.

use icalendar::parser::{read_calendar, unfold};

use crate::error::{CalViewError, CalViewResult};
use crate::ics::component::{RawComponent, RawProperty};
use crate::ics::content_line::ContentLineWriter;

pub fn normalize(text: &str) -> CalViewResult<String> {
    let unfolded = unfold(text);
    let parsed = read_calendar(&unfolded)
        .map_err(|e| CalViewError::parse(format!("unreadable ICS text: {e}")))?;

    let root = RawComponent {
        name: "VCALENDAR".to_string(),
        properties: parsed.properties.iter().map(RawProperty::from).collect(),
        components: parsed.components.iter().map(RawComponent::from).collect(),
    };

    let mut writer = ContentLineWriter::new();
    writer.component(&canonical_component(root));
    Ok(writer.finish())
}

fn canonical_component(component: RawComponent) -> RawComponent {
    let mut properties: Vec<RawProperty> = component
        .properties
        .into_iter()
        .map(canonical_property)
        .collect();
    properties.sort_by(|a, b| {
        (&a.name, &a.params, &a.value).cmp(&(&b.name, &b.params, &b.value))
    });

    let mut components: Vec<(String, RawComponent)> = component
        .components
        .into_iter()
        .map(|child| {
            let child = canonical_component(child);
            let mut writer = ContentLineWriter::new();
            writer.component(&child);
            (writer.finish(), child)
        })
        .collect();
    components.sort_by(|a, b| a.0.cmp(&b.0));

    RawComponent {
        name: component.name.to_ascii_uppercase(),
        properties,
        components: components.into_iter().map(|(_, c)| c).collect(),
    }
}

fn canonical_property(prop: RawProperty) -> RawProperty {
    let mut params: Vec<(String, Option<String>)> = prop
        .params
        .into_iter()
        .map(|(key, value)| {
            (
                key.to_ascii_uppercase(),
                value.map(|v| v.trim_matches('"').to_string()),
            )
        })
        // DATE-TIME is the default value type
        .filter(|(key, value)| !(key == "VALUE" && value.as_deref() == Some("DATE-TIME")))
        .collect();
    params.sort();

    RawProperty {
        name: prop.name.to_ascii_uppercase(),
        params,
        value: prop.value,
    }
}
