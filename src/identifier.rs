//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use core::num::NonZeroU16;

use winnow::error::ErrMode;
use winnow::Bytes;

use crate::error::DecodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// A packet identifier, as used to correlate QoS > 0 exchanges
///
/// Zero is reserved as the "no identifier" marker of QoS 0 PUBLISH packets
/// and never appears on the wire, hence the [`NonZeroU16`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketIdentifier(pub NonZeroU16);

impl PacketIdentifier {
    pub fn parse(input: &mut &Bytes) -> MResult<PacketIdentifier> {
        let value = crate::integers::parse_u16(input)?;

        match NonZeroU16::new(value) {
            Some(value) => Ok(PacketIdentifier(value)),
            None => Err(ErrMode::Cut(DecodeError::InvalidPacketIdentifier)),
        }
    }

    pub const fn binary_size(&self) -> u32 {
        2
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_u16(self.0.get())
    }
}

impl From<NonZeroU16> for PacketIdentifier {
    fn from(value: NonZeroU16) -> Self {
        PacketIdentifier(value)
    }
}
