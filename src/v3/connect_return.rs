//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::error::ErrMode;
use winnow::Bytes;

use crate::error::DecodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// The return code of a 3.1.1 CONNACK
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MConnectReturnCode {
    Accepted = 0x0,
    ProtocolNotAccepted = 0x1,
    IdentifierRejected = 0x2,
    ServerUnavailable = 0x3,
    BadUsernamePassword = 0x4,
    NotAuthorized = 0x5,
}

impl MConnectReturnCode {
    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        let byte = winnow::binary::u8(input)?;
        Self::try_from(byte).map_err(|_| ErrMode::Cut(DecodeError::InvalidReturnCode(byte)))
    }

    pub const fn binary_size(&self) -> u32 {
        1
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(*self as u8)
    }
}
