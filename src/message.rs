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

//! GELF [1.1] message assembly.
//!
//! [1.1]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//!
//! Given a [`TargetConfig`], a short message, a [`Level`], a timestamp & an [`EventContext`] from
//! which per-event values may be looked up, produce the JSON payload to hand to a [`Transport`].
//!
//! [`Transport`]: crate::transport::Transport

use crate::{
    config::TargetConfig,
    error::{Error, Result},
    level::Level,
};

use backtrace::Backtrace;
use chrono::prelude::*;
use serde_json::{Map, Value};

use std::collections::HashMap;

pub const GELF_VERSION: &str = "1.1";

/// Per-event values, looked up by the context keys named in
/// [`TargetConfig::additional_fields`].
pub trait EventContext {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl EventContext for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Assemble the GELF message as a JSON object.
///
/// Additional fields whose context key has no value for this event are left out; additional data
/// are always present. Both are written with the leading underscore GELF requires of non-standard
/// fields. `_id` is reserved by Graylog, so a field or datum named `id` is dropped.
pub fn build_message(
    config: &TargetConfig,
    short_message: &str,
    level: Level,
    timestamp: DateTime<Utc>,
    ctx: &impl EventContext,
) -> Map<String, Value> {
    let mut msg = Map::new();
    msg.insert("version".to_string(), Value::from(GELF_VERSION));
    if let Some(host) = config.origin_host() {
        msg.insert("host".to_string(), Value::from(host));
    }
    msg.insert("short_message".to_string(), Value::from(short_message));
    msg.insert(
        "timestamp".to_string(),
        Value::from(timestamp.timestamp_millis() as f64 / 1000.0),
    );
    msg.insert("level".to_string(), Value::from(level as u8));
    if let Some(facility) = config.facility() {
        msg.insert("_facility".to_string(), Value::from(facility));
    }

    for (name, key) in config.additional_fields() {
        if name == "id" {
            continue;
        }
        if let Some(value) = ctx.lookup(key) {
            msg.insert(format!("_{}", name), Value::String(value));
        }
    }
    for (name, value) in config.additional_data() {
        if name == "id" {
            continue;
        }
        msg.insert(format!("_{}", name), value.clone());
    }

    msg
}

/// Assemble & serialize the GELF message.
pub fn format_message(
    config: &TargetConfig,
    short_message: &str,
    level: Level,
    timestamp: Option<DateTime<Utc>>,
    ctx: &impl EventContext,
) -> Result<Vec<u8>> {
    let msg = build_message(
        config,
        short_message,
        level,
        timestamp.unwrap_or_else(Utc::now),
        ctx,
    );
    serde_json::to_vec(&msg).map_err(|err| Error::Json {
        source: err,
        back: Backtrace::new(),
    })
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::config::{FIELD_EXCEPTION, FIELD_THREAD_NAME};

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn core_fields() {
        let config = TargetConfig::builder().origin_host("bree.local").build();
        let msg = build_message(
            &config,
            "Hello, 世界!",
            Level::Informational,
            Utc.timestamp_millis_opt(1_656_000_000_123).unwrap(),
            &context(&[]),
        );
        assert_eq!(msg["version"], "1.1");
        assert_eq!(msg["host"], "bree.local");
        assert_eq!(msg["short_message"], "Hello, 世界!");
        assert_eq!(msg["timestamp"], 1_656_000_000.123);
        assert_eq!(msg["level"], 6);
        // No facility, and the default `exception` field had nothing to say
        assert_eq!(msg.len(), 5);
    }

    #[test]
    fn no_origin_host() {
        let mut config = TargetConfig::default();
        config.clear_origin_host();
        let msg = build_message(
            &config,
            "x",
            Level::Debug,
            std::time::UNIX_EPOCH.into(),
            &context(&[]),
        );
        assert!(msg.get("host").is_none());
        assert_eq!(msg["timestamp"], 0.0);
    }

    #[test]
    fn enrichment() {
        let mut config = TargetConfig::builder()
            .origin_host("bree.local")
            .facility("billing")
            .build();
        config.insert_additional_field("thread", FIELD_THREAD_NAME);
        config.insert_additional_field("ip_address", "ipAddress");
        config.insert_additional_field("id", "requestId");
        config
            .set_additional_data("{'env':'prod','shard':3,'id':'nope'}")
            .unwrap();

        let msg = build_message(
            &config,
            "charged",
            Level::Notice,
            std::time::UNIX_EPOCH.into(),
            &context(&[
                (FIELD_THREAD_NAME, "worker-1"),
                (FIELD_EXCEPTION, "boom: disk full"),
                ("requestId", "abc"),
            ]),
        );

        assert_eq!(msg["_facility"], "billing");
        assert_eq!(msg["_thread"], "worker-1");
        assert_eq!(msg["_exception"], "boom: disk full");
        assert_eq!(msg["_env"], "prod");
        assert_eq!(msg["_shard"], 3);
        // `ipAddress` wasn't in the context for this event
        assert!(msg.get("_ip_address").is_none());
        assert!(msg.get("_id").is_none());
    }

    #[test]
    fn serialized() {
        let config = TargetConfig::builder().origin_host("bree.local").build();
        let buf = format_message(
            &config,
            "Hello, world!",
            Level::Warning,
            Some(std::time::UNIX_EPOCH.into()),
            &context(&[]),
        )
        .unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "version": "1.1",
                "host": "bree.local",
                "short_message": "Hello, world!",
                "timestamp": 0.0,
                "level": 4,
            })
        );
    }
}
