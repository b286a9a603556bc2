//! Utility functions and macros shared across the crate

use crate::errors::PiazzaApiError;
use regex::Regex;
use serde_json::Value;

/// Macro to create a static LazyLock
#[macro_export]
macro_rules! make_static {
    ($expr:expr) => {{ std::sync::LazyLock::new(|| $expr) }};
}

/// Macro to define a lazily compiled regex together with its source text
#[macro_export]
macro_rules! define_regex {
    ($name:ident, $name_text:ident, $text:expr) => {
        static $name_text: &str = $text;

        static $name: std::sync::LazyLock<std::option::Option<regex::Regex>> =
            $crate::make_static!({ regex::Regex::new($text).ok() });
    };
}

/// Returns the compiled static regex, recompiling from `backup` if the static failed
pub(crate) fn safe_static_regex(
    regex: &Option<Regex>,
    backup: &str,
) -> Result<Regex, PiazzaApiError> {
    match regex {
        Some(regex) => Ok(regex.clone()),
        None => Regex::new(backup)
            .map_err(|_| PiazzaApiError::RegexError("Failed to compile regex".to_string())),
    }
}

/// Loose truthiness of a JSON value, the way the remote service reports flags.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// "yes"/"no" the way content endpoints spell the anonymous flag
#[inline(always)]
pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
