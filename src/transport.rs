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

//! The GELF transport layer.
//!
//! This module defines the [`Transport`] trait that all connections must support, as well as
//! the UDP & TCP implementations. Connections are normally obtained from
//! [`TargetConfig::create_connection`], which takes care of name resolution; the constructors here
//! take an already-resolved [`SocketAddr`].
//!
//! # Examples
//!
//! ```no_run
//! use gelf_target::config::TargetConfig;
//! let conn = TargetConfig::default().create_connection().unwrap();
//! ```
//!
//! [`TargetConfig::create_connection`]: crate::config::TargetConfig::create_connection

use crate::error::{Error, Result};

use backtrace::Backtrace;

use std::net::{SocketAddr, TcpStream, UdpSocket};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all GELF connections must support.
pub trait Transport {
    /// Send one serialized GELF message on this connection.
    fn send(&self, buf: &[u8]) -> Result<usize>;
}

/// Sending GELF messages via UDP datagrams, one message per datagram.
///
/// No chunking is performed; messages that do not fit in a datagram will fail to send.
pub struct UdpConnection {
    socket: UdpSocket,
}

impl UdpConnection {
    /// Bind an ephemeral local port & connect it to the collector at `addr`.
    pub fn connect(addr: SocketAddr) -> std::io::Result<UdpConnection> {
        // Bind to any available port on the same address family...
        let local: SocketAddr = if addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        // and connect to the collector at `addr`:
        socket.connect(addr)?;
        Ok(UdpConnection { socket })
    }
    /// The collector this connection sends to.
    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.peer_addr()
    }
}

impl Transport for UdpConnection {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        self.socket.send(buf).map_err(|err| Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        })
    }
}

/// Sending GELF messages via a TCP stream.
///
/// GELF over TCP frames each message with a trailing null byte.
pub struct TcpConnection {
    socket: TcpStream,
}

impl TcpConnection {
    /// Open a TCP connection to the collector at `addr`.
    pub fn connect(addr: SocketAddr) -> std::io::Result<TcpConnection> {
        Ok(TcpConnection {
            socket: TcpStream::connect(addr)?,
        })
    }
}

impl Transport for TcpConnection {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        use bytes::BufMut;
        use std::io::Write;

        let mut frame = Vec::with_capacity(buf.len() + 1);
        frame.put_slice(buf);
        frame.put_u8(0);

        // `Write` is implemented on `&TcpStream`, which lets us write through a shared reference.
        let mut writer: &TcpStream = &self.socket;
        writer
            .write_all(&frame)
            .and_then(|_| writer.flush())
            .map_err(|err| Error::Transport {
                source: Box::new(err),
                back: Backtrace::new(),
            })?;

        Ok(buf.len())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn udp_round_trip() {
        let collector = UdpSocket::bind("127.0.0.1:0").unwrap();
        collector
            .set_read_timeout(Some(std::time::Duration::from_secs(5)))
            .unwrap();
        let conn = UdpConnection::connect(collector.local_addr().unwrap()).unwrap();
        assert_eq!(conn.peer_addr().unwrap(), collector.local_addr().unwrap());

        assert_eq!(conn.send(b"{\"version\":\"1.1\"}").unwrap(), 17);
        let mut buf = [0u8; 64];
        let n = collector.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"{\"version\":\"1.1\"}");
    }

    #[test]
    fn tcp_frames_are_null_terminated() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let conn = TcpConnection::connect(listener.local_addr().unwrap()).unwrap();
        let (mut peer, _) = listener.accept().unwrap();

        assert_eq!(conn.send(b"{}").unwrap(), 2);
        drop(conn);

        let mut got = Vec::new();
        peer.read_to_end(&mut got).unwrap();
        assert_eq!(got, b"{}\0");
    }
}
