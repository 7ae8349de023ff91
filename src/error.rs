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
//! [gelf-target](crate) errors

use backtrace::Backtrace;

/// [gelf-target](crate) error type
///
/// A straightforward enumeration with a few match arms chosen on the basis of what the caller will
/// need to respond. Configuration errors ([`MalformedFieldSpec`], [`Json`], [`NotAnObject`]) are
/// reported at setup time; connection errors ([`UnresolvedHost`], [`Connection`]) when the
/// transport is created; the rest on the event path.
///
/// [`MalformedFieldSpec`]: Error::MalformedFieldSpec
/// [`Json`]: Error::Json
/// [`NotAnObject`]: Error::NotAnObject
/// [`UnresolvedHost`]: Error::UnresolvedHost
/// [`Connection`]: Error::Connection
#[non_exhaustive]
pub enum Error {
    /// The collector's host name could not be resolved to an address
    UnresolvedHost {
        host: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// The host resolved, but the connection could not be set up
    Connection {
        host: String,
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// A single-entry spec was not of the form `key=value`
    MalformedFieldSpec { spec: String, back: Backtrace },
    /// A bulk spec (or an outgoing message) was not valid JSON
    Json {
        source: serde_json::Error,
        back: Backtrace,
    },
    /// A bulk spec was valid JSON, but not a JSON object
    NotAnObject { spec: String, back: Backtrace },
    /// An Event had no message field
    NoMessageField {
        name: &'static str,
        back: Backtrace,
    },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnresolvedHost { host, .. } => write!(f, "Unknown GELF host {}", host),
            Error::Connection { host, port, .. } => write!(
                f,
                "Error connecting to GELF host {} on port {}",
                host, port
            ),
            Error::MalformedFieldSpec { spec, .. } => write!(
                f,
                "Expected value to be of form a=b but found '{}' instead.",
                spec
            ),
            Error::Json { source, .. } => write!(f, "Malformed JSON: {}", source),
            Error::NotAnObject { spec, .. } => {
                write!(f, "Expected a JSON object but found '{}' instead.", spec)
            }
            Error::NoMessageField { name, .. } => write!(
                f,
                "Event '{}' had no message field, and so was not forwarded to the GELF collector",
                name
            ),
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other gelf-target error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnresolvedHost { back, .. }
            | Error::Connection { back, .. }
            | Error::MalformedFieldSpec { back, .. }
            | Error::Json { back, .. }
            | Error::NotAnObject { back, .. }
            | Error::NoMessageField { back, .. }
            | Error::Transport { back, .. } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "gelf-target error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UnresolvedHost { source, .. }
            | Error::Connection { source, .. }
            | Error::Transport { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            Error::Json { source, .. } => Some(source as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
