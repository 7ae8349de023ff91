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
//! GELF level definitions.
//!
//! GELF borrows its `level` field from syslog: the eight severities of RFC [5424], numerically
//! identical to the constants in `<syslog.h>`.
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424

type StdResult<T, E> = std::result::Result<T, E>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    /// system is unusable
    Emergency = 0,
    /// action must be take immediately
    Alert = 1,
    /// critical conditions
    Critical = 2,
    /// error conditions
    Error = 3,
    /// warning conditions
    Warning = 4,
    /// normal, but significant condition
    Notice = 5,
    /// informational message
    Informational = 6,
    /// debug-level message
    Debug = 7,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Level::Emergency => "emergency",
                Level::Alert => "alert",
                Level::Critical => "critical",
                Level::Error => "error",
                Level::Warning => "warning",
                Level::Notice => "notice",
                Level::Informational => "informational",
                Level::Debug => "debug",
            }
        )
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Informational,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tracing_levels() {
        assert_eq!(6, Level::from(&tracing::Level::INFO) as u8);
        assert_eq!(7, Level::from(&tracing::Level::TRACE) as u8);
        assert_eq!(3, Level::from(&tracing::Level::ERROR) as u8);
        assert_eq!(format!("{}", Level::Warning), "warning".to_string());
    }
}
