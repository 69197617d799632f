//! Utility functions and types.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::fmt;

/// Everything except the RFC 3986 unreserved characters:
/// `A-Z`, `a-z`, `0-9`, `-`, `_`, `.` and `~`.
pub static URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode `s` the way AWS signatures expect.
///
/// Unreserved characters pass through untouched; every other byte, including
/// each byte of a multi-byte UTF-8 sequence, becomes `%XX` with upper-case
/// hex digits. Inputs made only of unreserved characters are borrowed back
/// without allocating.
pub fn uri_encode(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, &URI_ENCODE_SET).into()
}

/// Redact wraps secret material so that it can be printed in `Debug` output.
///
/// Values shorter than 12 characters are fully masked. Longer values keep
/// their first and last three characters so operators can tell keys apart
/// without leaking them.
#[derive(Clone, Copy)]
pub struct Redact<'a>(Option<&'a str>);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(Some(value.as_str()))
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref())
    }
}

impl fmt::Debug for Redact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(v) = self.0 else {
            return f.write_str("NONE");
        };

        let chars = v.chars().count();
        match chars {
            0 => f.write_str("EMPTY"),
            1..=11 => f.write_str("***"),
            _ => {
                let head: String = v.chars().take(3).collect();
                let tail: String = v.chars().skip(chars - 3).collect();
                write!(f, "{head}***{tail}")
            }
        }
    }
}
