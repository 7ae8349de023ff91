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
//! Configuring where [`tracing`] [`Event`]s go when they are shipped to a [GELF] collector such as
//! [Graylog], & what goes into them on the way.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/latest/tracing/struct.Event.html
//! [GELF]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//! [Graylog]: https://graylog.org
//!
//! # Introduction
//!
//! A GELF message is a JSON object with a handful of standard fields (`host`, `short_message`,
//! `timestamp`, `level`) plus any number of "additional" fields, whose names begin with an
//! underscore. This crate is mostly concerned with the latter: which additional fields to emit,
//! and where their values come from.
//!
//! [`TargetConfig`](config::TargetConfig) carries two kinds:
//!
//! - *additional fields*, whose values are looked up per event: the current thread name, the
//!   event's timestamp or target, or any field recorded on the event or on one of the spans
//!   enclosing it
//! - *additional data*, literal values attached to every message
//!
//! Both can be configured from text, either in bulk as a JSON object (single quotes welcome) or
//! one at a time as `key=value`.
//!
//! # Usage
//!
//! ```no_run
//! use gelf_target::{config::TargetConfig, layer::Layer};
//! use tracing::info;
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! let config = TargetConfig::builder()
//!     .host("graylog.example.com")
//!     .facility("billing")
//!     .additional_fields("{'thread':'threadName','exception':'exception'}")
//!     .unwrap()
//!     .additional_data("{'env':'prod'}")
//!     .unwrap()
//!     .build();
//!
//! let subscriber = Registry::default().with(Layer::try_from_config(config).unwrap());
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! info!("Hello, world!");
//! ```
//!
//! Will send something like this to port 12201 on graylog.example.com:
//!
//! ```text
//! {"_env":"prod","_facility":"billing","_thread":"main","host":"bree",
//!  "level":6,"short_message":"Hello, world!","timestamp":1656025855.123,"version":"1.1"}
//! ```

pub mod config;
pub mod error;
pub mod layer;
pub mod level;
pub mod message;
pub mod relaxed;
pub mod transport;
