//! UTC timestamps in the shapes SigV4 expects.

use chrono::Utc;

/// Signing timestamps are always UTC.
pub type DateTime = chrono::DateTime<Utc>;

const DATE: &str = "%Y%m%d";
const ISO8601_BASIC: &str = "%Y%m%dT%H%M%SZ";

/// Current wall clock time.
pub fn now() -> DateTime {
    Utc::now()
}

/// `20220301`, the date part of a credential scope.
pub fn format_date(t: DateTime) -> String {
    t.format(DATE).to_string()
}

/// `20220313T072004Z`, as carried by `x-amz-date`.
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601_BASIC).to_string()
}
