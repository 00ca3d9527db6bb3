//! ICS reading and writing (RFC 5545).
//!
//! Parsing goes through the icalendar crate's parser; output is produced by
//! our own content-line writer so that unmodelled properties survive a round
//! trip in their original order.

pub mod component;
mod content_line;
pub(crate) mod generate;
mod normalize;
mod parse;
mod vtimezone;

pub use component::{EndEncoding, IcsSource, RawComponent, RawProperty, escape_text, unescape_text};
pub use normalize::normalize;
