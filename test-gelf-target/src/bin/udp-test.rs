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

//! Test writing GELF over UDP to port 12201 on the local host.

use gelf_target::{config::TargetConfig, layer::Layer};
use tracing::{debug, error, info, info_span, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let config = TargetConfig::builder()
        .host("127.0.0.1")
        .facility("udp-test")
        .additional_fields("{'thread':'threadName','logger':'loggerName','exception':'exception'}")
        .unwrap()
        .additional_field("request=request_id")
        .unwrap()
        .additional_data("{'suite':'gelf-target','run':1}")
        .unwrap()
        .build();

    // Setup the real subsriber...
    let subscriber = Registry::default().with(Layer::try_from_config(config).unwrap());
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    let span = info_span!("request", request_id = "udp-0001");
    let _enter = span.enter();

    trace!("Hello, 世界!");
    debug!("Hello, 世界!");
    info!("Hello, 世界!");
    warn!("Hello, 世界!");
    error!("Hello, 世界!");
}
