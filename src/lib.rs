//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! A zero-copy codec for MQTT control packets
//!
//! This crate converts between the wire representation of MQTT 3.1.1
//! (protocol level 4) and MQTT 5.0 (protocol level 5) control packets and
//! typed, borrowed packet structures. It does transport no favours: bytes go
//! in, packets come out, and the other way around. Sockets, sessions and
//! keep-alive timers belong to the caller.
//!
//! Decoded packets borrow every string and byte-string field from the input
//! buffer and the decoder never allocates. Encoding is split into a
//! validation pass that computes the exact packet size and a write pass that
//! fills a caller-provided buffer, see [`write::WriteMqttPacket`].
//!
//! The outer framing layer is [`streaming::StreamingDecoder`], which carves
//! complete packets out of a growing receive buffer and reports
//! [`error::DecodeError::IncompleteBuffer`] until a packet is fully
//! available.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
#![deny(missing_debug_implementations)]

pub mod boolean;
pub mod bytes;
pub mod connect;
pub mod error;
pub mod fixed_header;
pub mod identifier;
pub mod integers;
pub mod level;
pub mod qos;
pub mod streaming;
pub mod strings;
pub mod topic;
pub mod v3;
pub mod v5;
pub mod write;

pub(crate) mod util;


/// The result of parsing a part of an MQTT packet
pub type MResult<O> = winnow::PResult<O, crate::error::DecodeError>;

/// Decoder behaviour that the MQTT specification leaves to the
/// implementation
///
/// Everything else about the wire format is fixed; this is the only runtime
/// knob the codec has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserSettings {
    /// Enforce the 3.1.1 recommendation that client identifiers are 1 to 23
    /// characters from `[0-9A-Za-z]`.
    ///
    /// Servers are allowed to accept more than that, so this defaults to
    /// `false`.
    pub strict_client_identifier: bool,
}
