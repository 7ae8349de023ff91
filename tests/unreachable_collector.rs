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

//! Failing sends under a *global* dispatcher.
//!
//! This lives in its own test binary because a global default can only be installed once per
//! process, and because a scoped dispatcher would mask the layer's own error report being
//! dispatched back into it.

use gelf_target::{
    config::TargetConfig,
    error::{Error, Result},
    layer::Layer,
    transport::Transport,
};

use backtrace::Backtrace;
use tracing::info;
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

struct Unreachable(Arc<AtomicUsize>);

impl Transport for Unreachable {
    fn send(&self, _buf: &[u8]) -> Result<usize> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(Error::Transport {
            source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
            back: Backtrace::new(),
        })
    }
}

#[test]
fn global_dispatcher_survives_unreachable_collector() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let subscriber = Registry::default().with(Layer::new(
        TargetConfig::default(),
        Unreachable(attempts.clone()),
    ));
    tracing::subscriber::set_global_default(subscriber).unwrap();

    info!("one event");
    // Each event is tried exactly once; the failure report is not forwarded in turn.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    info!("another event");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
