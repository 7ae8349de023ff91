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

//! Test writing null-byte framed GELF over TCP to port 12201 on the local host.

use gelf_target::{config::TargetConfig, layer::Layer};
use tracing::{error, info, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let mut config = TargetConfig::default();
    config.set_host("127.0.0.1");
    config.set_facility("tcp-test");
    config.add_additional_field("thread=threadName").unwrap();
    config.add_additional_data("suite=gelf-target").unwrap();

    let transport = config.create_tcp_connection().unwrap();
    let subscriber = Registry::default().with(Layer::new(config, transport));
    let _guard = tracing::subscriber::set_default(subscriber);

    let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    info!("Hello, 世界!");
    warn!("Hello, 世界!");
    error!(
        exception = &err as &(dyn std::error::Error + 'static),
        "Hello, 世界!"
    );
}
