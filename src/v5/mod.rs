//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Decoding and encoding of MQTT 5.0 packets, protocol level 5
//!
//! The v5 packet skeletons match their 3.1.1 counterparts, plus a property
//! section per packet, reason codes on the acknowledgements, and the AUTH
//! packet.

pub mod packets;
pub mod properties;
pub mod reason_code;
pub mod variable_header;
