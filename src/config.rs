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

//! Where GELF messages go, & what goes into them.
//!
//! [`TargetConfig`] holds the collector's address, the `host` & `_facility` fields stamped on
//! every message, and two maps of extra fields:
//!
//! - **additional fields** map a GELF field name to a *context key*; the value is looked up afresh
//!   for every event (see [`FIELD_THREAD_NAME`] & friends, or the name of any span or event field)
//! - **additional data** map a GELF field name to a literal JSON value emitted verbatim on every
//!   message
//!
//! Both may be given in bulk as a relaxed JSON object, or one at a time as `key=value`:
//!
//! ```rust
//! use gelf_target::config::TargetConfig;
//!
//! let mut config = TargetConfig::default();
//! config.set_additional_fields("{'thread':'threadName','exception':'exception'}").unwrap();
//! config.add_additional_field("ip_address=ipAddress").unwrap();
//! config.set_additional_data("{'env':'prod','shard':3}").unwrap();
//!
//! assert_eq!(config.additional_fields().len(), 3);
//! assert_eq!(config.additional_data()["shard"], 3);
//! ```

use crate::{
    error::{Error, Result},
    relaxed::{parse_field, parse_json_object, to_field_text},
    transport::{TcpConnection, UdpConnection},
};

use backtrace::Backtrace;
use serde_json::Value;
use tracing::{debug, trace};

use std::{
    collections::HashMap,
    net::{SocketAddr, ToSocketAddrs},
};

/// Context key for the name of the thread on which the event was emitted
pub const FIELD_THREAD_NAME: &str = "threadName";
/// Context key for the event's timestamp, in milliseconds since the Unix epoch
pub const FIELD_TIMESTAMP_MS: &str = "timestampMs";
/// Context key for the logger name (the `tracing` target)
pub const FIELD_LOGGER_NAME: &str = "loggerName";
/// Context key for the exception (error) attached to the event
pub const FIELD_EXCEPTION: &str = "exception";

/// The collector host used unless told otherwise
pub const DEFAULT_HOST: &str = "localhost";
/// The standard GELF port
pub const DEFAULT_PORT: u16 = 12201;

/// Configuration for one GELF output.
///
/// Meant to be populated at setup time & read thereafter; every mutator takes `&mut self`, so
/// once a [`Layer`] owns it, it is effectively frozen.
///
/// [`Layer`]: crate::layer::Layer
#[derive(Clone, Debug)]
pub struct TargetConfig {
    host: String,
    port: u16,
    origin_host: Option<String>,
    facility: Option<String>,
    additional_fields: HashMap<String, String>,
    additional_data: HashMap<String, Value>,
}

/// Best-effort local hostname; `None` if it can't be had (or isn't UTF-8).
fn local_hostname() -> Option<String> {
    hostname::get().ok().and_then(|hn| hn.into_string().ok())
}

/// Pick the first IPv4 address, falling back to the first address of any family. Collectors are
/// commonly bound to `0.0.0.0`, which an IPv6 `localhost` would miss.
fn prefer_ipv4<I: IntoIterator<Item = SocketAddr>>(addrs: I) -> Option<SocketAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}

impl std::default::Default for TargetConfig {
    fn default() -> Self {
        let mut additional_fields = HashMap::new();
        additional_fields.insert(FIELD_EXCEPTION.to_string(), FIELD_EXCEPTION.to_string());
        TargetConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            origin_host: local_hostname(),
            facility: None,
            additional_fields,
            additional_data: HashMap::new(),
        }
    }
}

impl TargetConfig {
    pub fn builder() -> TargetConfigBuilder {
        TargetConfigBuilder {
            imp: TargetConfig::default(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
    pub fn set_host<S: Into<String>>(&mut self, host: S) {
        self.host = host.into();
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }
    /// The value of the GELF `host` field: the machine on which events originate.
    pub fn origin_host(&self) -> Option<&str> {
        self.origin_host.as_deref()
    }
    pub fn set_origin_host<S: Into<String>>(&mut self, origin_host: S) {
        self.origin_host = Some(origin_host.into());
    }
    pub fn clear_origin_host(&mut self) {
        self.origin_host = None;
    }
    pub fn facility(&self) -> Option<&str> {
        self.facility.as_deref()
    }
    pub fn set_facility<S: Into<String>>(&mut self, facility: S) {
        self.facility = Some(facility.into());
    }
    pub fn clear_facility(&mut self) {
        self.facility = None;
    }

    /// Resolve [`host`](TargetConfig::host) & open a UDP connection to the collector.
    ///
    /// This blocks on name resolution, so call it once, at setup time. The connection belongs to
    /// the caller.
    pub fn create_connection(&self) -> Result<UdpConnection> {
        self.create_connection_with(UdpConnection::connect)
    }

    /// Resolve [`host`](TargetConfig::host) & open a TCP connection to the collector.
    pub fn create_tcp_connection(&self) -> Result<TcpConnection> {
        self.create_connection_with(TcpConnection::connect)
    }

    /// Resolve [`host`](TargetConfig::host), then hand the first IPv4 address found (or failing that,
    /// the first address of any family) to `factory`.
    ///
    /// A failure to resolve is reported as [`Error::UnresolvedHost`]; a failure from `factory` as
    /// [`Error::Connection`].
    pub fn create_connection_with<C, F>(&self, factory: F) -> Result<C>
    where
        F: FnOnce(SocketAddr) -> std::io::Result<C>,
    {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .and_then(|addrs| {
                prefer_ipv4(addrs).ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "host resolved to no addresses",
                    )
                })
            })
            .map_err(|err| Error::UnresolvedHost {
                host: self.host.clone(),
                source: Box::new(err),
                back: Backtrace::new(),
            })?;

        debug!("connecting to GELF collector {} at {}", self.host, addr);

        factory(addr).map_err(|err| Error::Connection {
            host: self.host.clone(),
            port: self.port,
            source: Box::new(err),
            back: Backtrace::new(),
        })
    }

    /// Additional fields: GELF field name to context key.
    ///
    /// Freshly constructed, this holds the single entry `exception` => `exception`.
    pub fn additional_fields(&self) -> &HashMap<String, String> {
        &self.additional_fields
    }

    /// Replace all additional fields with those in `spec`, a (relaxed) JSON object.
    ///
    /// Values that aren't strings are stored as their JSON text. Everything already present goes,
    /// the default `exception` entry included. If `spec` doesn't parse, nothing changes.
    pub fn set_additional_fields(&mut self, spec: &str) -> Result<()> {
        let parsed = parse_json_object(spec)?;
        trace!("replacing additional fields with {}", spec);
        self.additional_fields.clear();
        self.additional_fields.extend(
            parsed
                .into_iter()
                .map(|(name, value)| (name, to_field_text(value))),
        );
        Ok(())
    }

    /// Add (or overwrite) one additional field given as `name=key`, e.g. `ip_address=ipAddress`.
    pub fn add_additional_field(&mut self, field_spec: &str) -> Result<()> {
        let (name, key) = parse_field(field_spec)?;
        self.additional_fields.insert(name, key);
        Ok(())
    }

    pub fn insert_additional_field<N: Into<String>, K: Into<String>>(
        &mut self,
        name: N,
        key: K,
    ) -> Option<String> {
        self.additional_fields.insert(name.into(), key.into())
    }

    pub fn remove_additional_field(&mut self, name: &str) -> Option<String> {
        self.additional_fields.remove(name)
    }

    pub fn clear_additional_fields(&mut self) {
        self.additional_fields.clear();
    }

    /// Additional data: GELF field name to a literal value.
    pub fn additional_data(&self) -> &HashMap<String, Value> {
        &self.additional_data
    }

    /// Replace all additional data with the entries of `spec`, a (relaxed) JSON object. Values
    /// keep their JSON type. If `spec` doesn't parse, nothing changes.
    pub fn set_additional_data(&mut self, spec: &str) -> Result<()> {
        let parsed = parse_json_object(spec)?;
        trace!("replacing additional data with {}", spec);
        self.additional_data.clear();
        self.additional_data.extend(parsed);
        Ok(())
    }

    /// Add (or overwrite) one datum given as `name=value`; the value is always a string.
    pub fn add_additional_data(&mut self, field_spec: &str) -> Result<()> {
        let (name, value) = parse_field(field_spec)?;
        self.additional_data.insert(name, Value::String(value));
        Ok(())
    }

    pub fn insert_additional_data<N: Into<String>, V: Into<Value>>(
        &mut self,
        name: N,
        value: V,
    ) -> Option<Value> {
        self.additional_data.insert(name.into(), value.into())
    }

    pub fn remove_additional_data(&mut self, name: &str) -> Option<Value> {
        self.additional_data.remove(name)
    }

    pub fn clear_additional_data(&mut self) {
        self.additional_data.clear();
    }
}

pub struct TargetConfigBuilder {
    imp: TargetConfig,
}

impl TargetConfigBuilder {
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.imp.set_host(host);
        self
    }
    pub fn port(mut self, port: u16) -> Self {
        self.imp.set_port(port);
        self
    }
    pub fn origin_host<S: Into<String>>(mut self, origin_host: S) -> Self {
        self.imp.set_origin_host(origin_host);
        self
    }
    pub fn facility<S: Into<String>>(mut self, facility: S) -> Self {
        self.imp.set_facility(facility);
        self
    }
    pub fn additional_fields(mut self, spec: &str) -> Result<Self> {
        self.imp.set_additional_fields(spec)?;
        Ok(self)
    }
    pub fn additional_field(mut self, field_spec: &str) -> Result<Self> {
        self.imp.add_additional_field(field_spec)?;
        Ok(self)
    }
    pub fn additional_data(mut self, spec: &str) -> Result<Self> {
        self.imp.set_additional_data(spec)?;
        Ok(self)
    }
    pub fn additional_datum(mut self, field_spec: &str) -> Result<Self> {
        self.imp.add_additional_data(field_spec)?;
        Ok(self)
    }
    pub fn build(self) -> TargetConfig {
        self.imp
    }
}
