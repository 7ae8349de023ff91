// Copyright (C) 2022 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of gelf-target.
//
// gelf-target is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// gelf-target is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with gelf-target.  If
// not, see <http://www.gnu.org/licenses/>.

//! Parsing the textual forms in which additional fields & data are configured.
//!
//! Two forms are accepted:
//!
//! 1. a "relaxed" JSON object, in which single quotes may stand in for double quotes:
//!
//!    ```text
//!    {'threadName':'thread','timestampMs':'timestampMs'}
//!    ```
//!
//!    This is convenient in configuration formats where escaping `"` is a nuisance. The
//!    relaxation is a blunt textual substitution performed before parsing, so a literal single
//!    quote can never appear inside a key or value given this way.
//!
//! 2. a single `key=value` pair, split on the first `=`:
//!
//!    ```text
//!    ip_address=ipAddress
//!    ```

use crate::error::{Error, Result};

use backtrace::Backtrace;
use serde_json::{Map, Value};

/// Parse `spec` as a JSON object, after replacing every `'` with `"`.
///
/// Fails with [`Error::Json`] if the text isn't valid JSON, and with [`Error::NotAnObject`] if it
/// is, but the top-level value is an array or a scalar.
pub fn parse_json_object(spec: &str) -> Result<Map<String, Value>> {
    let text = spec.replace('\'', "\"");
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::NotAnObject {
            spec: spec.to_string(),
            back: Backtrace::new(),
        }),
        Err(err) => Err(Error::Json {
            source: err,
            back: Backtrace::new(),
        }),
    }
}

/// Split `spec` into `(key, value)` on its first `=`; everything after that (further `=`
/// included) is the value.
pub fn parse_field(spec: &str) -> Result<(String, String)> {
    spec.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| Error::MalformedFieldSpec {
            spec: spec.to_string(),
            back: Backtrace::new(),
        })
}

/// Render a JSON value as the text stored for an additional field: strings as themselves,
/// everything else as compact JSON (`5`, `true`, `null`, `[1,2]`).
pub fn to_field_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn single_quotes() {
        let relaxed = parse_json_object("{'x':'y'}").unwrap();
        let strict = parse_json_object("{\"x\":\"y\"}").unwrap();
        assert_eq!(relaxed, strict);
        assert_eq!(relaxed.get("x"), Some(&Value::String("y".to_string())));

        // Mixed is fine, too
        let mixed = parse_json_object("{'n':5, \"b\":true}").unwrap();
        assert_eq!(mixed.get("n"), Some(&Value::from(5)));
        assert_eq!(mixed.get("b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn not_an_object() {
        assert!(matches!(
            parse_json_object("[1,2]"),
            Err(Error::NotAnObject { .. })
        ));
        assert!(matches!(
            parse_json_object("5"),
            Err(Error::NotAnObject { .. })
        ));
        assert!(matches!(
            parse_json_object("{'a':"),
            Err(Error::Json { .. })
        ));
        // An embedded single quote turns into a stray double quote
        assert!(parse_json_object("{'a':'it's'}").is_err());
    }

    #[test]
    fn key_value() {
        assert_eq!(
            parse_field("ip_address=ipAddress").unwrap(),
            ("ip_address".to_string(), "ipAddress".to_string())
        );
        assert_eq!(
            parse_field("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_field("a=").unwrap(), ("a".to_string(), String::new()));
        assert_eq!(parse_field("=b").unwrap(), (String::new(), "b".to_string()));
        assert!(matches!(
            parse_field("no-delimiter"),
            Err(Error::MalformedFieldSpec { .. })
        ));
    }

    #[test]
    fn field_text() {
        assert_eq!(to_field_text(Value::from("thread")), "thread");
        assert_eq!(to_field_text(Value::from(5)), "5");
        assert_eq!(to_field_text(Value::Bool(false)), "false");
        assert_eq!(to_field_text(Value::Null), "null");
        assert_eq!(to_field_text(serde_json::json!([1, 2])), "[1,2]");
    }
}
