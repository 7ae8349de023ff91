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

//! [gelf-target](crate) [`Layer`] implementation.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! The translation from a [`tracing`] [`Event`] to a GELF message occurs in three parts:
//!
//! 1. gathering the event's fields, together with those of the spans in which it occurred
//!    (innermost wins, and the event's own fields win over all of them)
//!
//! 2. assembling a GELF message from the [`TargetConfig`], looking up each additional field's
//!    context key among those fields (or the well-known keys: thread name, timestamp, logger name)
//!
//! 3. transporting that message to the collector
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/latest/tracing/struct.Event.html

use crate::{
    config::{TargetConfig, FIELD_LOGGER_NAME, FIELD_THREAD_NAME, FIELD_TIMESTAMP_MS},
    error::{Error, Result},
    level::Level,
    message::{format_message, EventContext},
    transport::{Transport, UdpConnection},
};

use backtrace::Backtrace;
use chrono::prelude::*;
use tracing::{
    field::{Field, Visit},
    span::{Attributes, Id, Record},
    Event,
};
use tracing_subscriber::{layer::Context, registry::LookupSpan};

// When the tracing-log feature is enabled, use NormalizeEvent to recover the metadata of events
// that originated from the `log` crate.
#[cfg(feature = "tracing-log")]
use tracing_log::NormalizeEvent;

use std::{cell::Cell, collections::HashMap};

thread_local! {
    // Set while this thread is inside `on_event`; reporting a failure through `tracing` would
    // otherwise come straight back here under a global dispatcher.
    static FORWARDING: Cell<bool> = Cell::new(false);
}

/// Marks the current thread as forwarding an event until dropped.
struct ForwardingGuard;

impl ForwardingGuard {
    /// `None` if this thread is already forwarding an event.
    fn enter() -> Option<ForwardingGuard> {
        FORWARDING.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(ForwardingGuard)
            }
        })
    }
}

impl Drop for ForwardingGuard {
    fn drop(&mut self) {
        FORWARDING.with(|flag| flag.set(false));
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      recording fields                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The fields recorded on a span, stashed in its extensions.
struct SpanFields(HashMap<String, String>);

struct FieldVisitor<'a> {
    fields: &'a mut HashMap<String, String>,
}

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // The `message` field is "pre-formatted" by the tracing macros into a
        // `std::fmt::Arguments`, whose `Debug` output has no enclosing quotes.
        self.fields.insert(field.name().to_string(), format!("{:?}", value));
    }
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }
    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let mut text = value.to_string();
        let mut source = value.source();
        while let Some(err) = source {
            text.push_str(": ");
            text.push_str(&err.to_string());
            source = err.source();
        }
        self.fields.insert(field.name().to_string(), text);
    }
}

/// What an additional field may be looked up in, for one event.
struct LayerContext<'a> {
    fields: HashMap<String, String>,
    logger: &'a str,
    timestamp: DateTime<Utc>,
}

impl EventContext for LayerContext<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            FIELD_THREAD_NAME => {
                let thread = std::thread::current();
                Some(
                    thread
                        .name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{:?}", thread.id())),
                )
            }
            FIELD_TIMESTAMP_MS => Some(self.timestamp.timestamp_millis().to_string()),
            FIELD_LOGGER_NAME => Some(self.logger.to_string()),
            _ => self.fields.get(key).cloned(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          struct Layer                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that will send [`Event`]s to a
/// GELF collector.
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/latest/tracing/struct.Event.html
pub struct Layer<T: Transport> {
    config: TargetConfig,
    transport: T,
}

impl Layer<UdpConnection> {
    /// Attempt to construct a [`Layer`] that will send GELF messages via UDP to the collector
    /// named in `config`.
    pub fn try_from_config(config: TargetConfig) -> Result<Self> {
        let transport = config.create_connection()?;
        Ok(Layer { config, transport })
    }
}

impl<T: Transport> Layer<T> {
    /// Construct a [`Layer`] that will send messages assembled according to `config` via
    /// `transport`
    pub fn new(config: TargetConfig, transport: T) -> Self {
        Layer { config, transport }
    }
    pub fn config(&self) -> &TargetConfig {
        &self.config
    }
}

impl<S, T> tracing_subscriber::layer::Layer<S> for Layer<T>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    T: Transport + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut fields = HashMap::new();
            attrs.record(&mut FieldVisitor {
                fields: &mut fields,
            });
            span.extensions_mut().insert(SpanFields(fields));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(SpanFields(fields)) = span.extensions_mut().get_mut::<SpanFields>() {
                values.record(&mut FieldVisitor { fields });
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let _guard = match ForwardingGuard::enter() {
            Some(guard) => guard,
            None => return,
        };

        #[cfg(feature = "tracing-log")]
        let normalized_meta = event.normalized_metadata();
        #[cfg(feature = "tracing-log")]
        let meta = normalized_meta.as_ref().unwrap_or_else(|| event.metadata());
        #[cfg(not(feature = "tracing-log"))]
        let meta = event.metadata();

        let timestamp = Utc::now();

        let mut fields = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanFields(span_fields)) = span.extensions().get::<SpanFields>() {
                    fields.extend(span_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
        let mut event_fields = HashMap::new();
        event.record(&mut FieldVisitor {
            fields: &mut event_fields,
        });
        let message = event_fields.remove("message");
        fields.extend(event_fields);

        let lookup = LayerContext {
            fields,
            logger: meta.target(),
            timestamp,
        };

        message
            .ok_or_else(|| Error::NoMessageField {
                name: meta.name(),
                back: Backtrace::new(),
            })
            .and_then(|msg| {
                format_message(
                    &self.config,
                    &msg,
                    Level::from(meta.level()),
                    Some(timestamp),
                    &lookup,
                )
            })
            .and_then(|buf| self.transport.send(&buf))
            .map(|_| ())
            .unwrap_or_else(|err| {
                ::tracing::error!("gelf-target failed to forward an event: {}", err);
            })
    }
}
