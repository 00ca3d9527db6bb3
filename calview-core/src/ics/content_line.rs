//! Content line output: parameter quoting, 75-octet folding and CRLF endings.

use crate::ics::component::{RawComponent, RawProperty};

const MAX_LINE_OCTETS: usize = 75;

/// Accumulates ICS text line by line.
#[derive(Debug, Default)]
pub(crate) struct ContentLineWriter {
    out: String,
}

impl ContentLineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, name: &str) {
        self.line(&format!("BEGIN:{name}"));
    }

    pub fn end(&mut self, name: &str) {
        self.line(&format!("END:{name}"));
    }

    pub fn property(&mut self, prop: &RawProperty) {
        let mut line = prop.name.clone();
        for (key, value) in &prop.params {
            line.push(';');
            line.push_str(key);
            if let Some(value) = value {
                line.push('=');
                line.push_str(&quote_param(value));
            }
        }
        line.push(':');
        line.push_str(&prop.value);
        self.line(&line);
    }

    pub fn component(&mut self, component: &RawComponent) {
        self.begin(&component.name);
        for prop in &component.properties {
            self.property(prop);
        }
        for child in &component.components {
            self.component(child);
        }
        self.end(&component.name);
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// Write one logical line, folding it into chunks of at most 75 octets.
    /// Continuation lines start with a single space, which counts against the limit.
    fn line(&mut self, line: &str) {
        let mut budget = MAX_LINE_OCTETS;
        let mut used = 0;
        for c in line.chars() {
            let len = c.len_utf8();
            if used + len > budget {
                self.out.push_str("\r\n ");
                budget = MAX_LINE_OCTETS - 1;
                used = 0;
            }
            self.out.push(c);
            used += len;
        }
        self.out.push_str("\r\n");
    }
}

/// Parameter values containing `:`, `;` or `,` must be quoted.
fn quote_param(value: &str) -> String {
    if value.starts_with('"') || !value.contains([':', ';', ',']) {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}
