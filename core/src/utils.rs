//! Utility functions and types.

use std::fmt::{Debug, Formatter};

/// Redact hides a secret in `Debug` output.
///
/// Values shorter than 12 characters are shown as `***`, longer ones keep
/// their first and last three characters so they can still be told apart in
/// logs. Used for credentials, base urls and request bodies.
pub struct Redact<'a>(Option<&'a str>);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = self.0.unwrap_or_default();
        let chars = value.chars().collect::<Vec<_>>();

        match chars.len() {
            0 => f.write_str("EMPTY"),
            n if n < 12 => f.write_str("***"),
            n => {
                let head = chars[..3].iter().collect::<String>();
                let tail = chars[n - 3..].iter().collect::<String>();
                write!(f, "{head}***{tail}")
            }
        }
    }
}
