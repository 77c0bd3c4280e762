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

/// The protocol name every CONNECT packet carries
pub const PROTOCOL_NAME: &str = "MQTT";

/// The protocol level of a CONNECT packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolLevel {
    /// MQTT 3.1.1, protocol level 4
    V3,
    /// MQTT 5.0, protocol level 5
    V5,
}

impl ProtocolLevel {
    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        let byte = winnow::binary::u8(input)?;
        match byte {
            4 => Ok(Self::V3),
            5 => Ok(Self::V5),
            _ => Err(ErrMode::Cut(DecodeError::InvalidProtocolLevel(byte))),
        }
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        match self {
            ProtocolLevel::V3 => buffer.write_byte(4),
            ProtocolLevel::V5 => buffer.write_byte(5),
        }
    }

    /// Assert that this is the level the caller routed for
    pub fn require(self, expected: ProtocolLevel) -> Result<(), DecodeError> {
        if self == expected {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedProtocolLevel)
        }
    }
}

/// Read the protocol name and level that open every CONNECT body
///
/// This is the version detection hook: peel the CONNECT packet off the
/// stream, run this over its body, and pick the v3 or v5 decoder based on
/// the result.
pub fn parse_protocol_header(input: &mut &Bytes) -> MResult<ProtocolLevel> {
    let name = crate::bytes::parse_binary_data(input)?;

    if name != PROTOCOL_NAME.as_bytes() {
        return Err(ErrMode::Cut(DecodeError::InvalidProtocolName));
    }

    ProtocolLevel::parse(input)
}

pub fn write_protocol_header<W: WriteMqttPacket>(
    buffer: &mut W,
    level: ProtocolLevel,
) -> WResult<W> {
    crate::strings::write_string(buffer, PROTOCOL_NAME)?;
    level.write(buffer)
}

#[cfg(test)]
mod tests {
    use winnow::error::ErrMode;
    use winnow::Bytes;

    use super::parse_protocol_header;
    use super::ProtocolLevel;
    use crate::error::DecodeError;

    #[test]
    fn check_protocol_header() {
        let input = [0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04];
        assert_eq!(
            parse_protocol_header(&mut Bytes::new(&input)).unwrap(),
            ProtocolLevel::V3
        );

        let input = [0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05];
        assert_eq!(
            parse_protocol_header(&mut Bytes::new(&input)).unwrap(),
            ProtocolLevel::V5
        );
    }

    #[test]
    fn check_wrong_protocol_name() {
        let input = [0x00, 0x04, b'M', b'Q', b'T', b'X', 0x04];
        assert_eq!(
            parse_protocol_header(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidProtocolName)
        );
    }

    #[test]
    fn check_unsupported_level() {
        let input = [0x00, 0x04, b'M', b'Q', b'T', b'T', 0x03];
        assert_eq!(
            parse_protocol_header(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidProtocolLevel(3))
        );
    }

    #[test]
    fn check_require() {
        ProtocolLevel::V3.require(ProtocolLevel::V3).unwrap();
        assert_eq!(
            ProtocolLevel::V5.require(ProtocolLevel::V3).unwrap_err(),
            DecodeError::UnexpectedProtocolLevel
        );
    }
}
