//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Everything around parsing the fixed MQTT header
//!
//! The first byte packs the packet type into the upper nibble and the flags
//! into the lower one. Every type except PUBLISH has a fixed required flag
//! pattern; PUBLISH uses the flags for DUP, QoS and RETAIN.

use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::stream::Stream;
use winnow::stream::StreamIsPartial;
use winnow::Parser;

use crate::error::DecodeError;
use crate::integers::parse_variable_u32;
use crate::integers::variable_u32_binary_size;
use crate::integers::write_variable_u32;
use crate::qos::qos_from_bits;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketType {
    Connect,
    Connack,
    Publish {
        dup: bool,
        qos: crate::qos::QualityOfService,
        retain: bool,
    },
    Puback,
    Pubrec,
    Pubrel,
    Pubcomp,
    Subscribe,
    Suback,
    Unsubscribe,
    Unsuback,
    Pingreq,
    Pingresp,
    Disconnect,
    Auth,
}

impl PacketType {
    /// Decode the first byte of a packet
    pub fn from_byte(byte: u8) -> Result<PacketType, DecodeError> {
        let packet_type = byte >> 4;
        let flags = byte & 0b0000_1111;

        let packet_type = match (packet_type, flags) {
            (0, _) => return Err(DecodeError::InvalidMessageType(0)),
            (1, 0) => PacketType::Connect,
            (2, 0) => PacketType::Connack,
            (3, flags) => PacketType::Publish {
                dup: flags & 0b1000 != 0,
                qos: qos_from_bits((flags & 0b0110) >> 1)?,
                retain: flags & 0b0001 != 0,
            },
            (4, 0) => PacketType::Puback,
            (5, 0) => PacketType::Pubrec,
            (6, 0b0010) => PacketType::Pubrel,
            (7, 0) => PacketType::Pubcomp,
            (8, 0b0010) => PacketType::Subscribe,
            (9, 0) => PacketType::Suback,
            (10, 0b0010) => PacketType::Unsubscribe,
            (11, 0) => PacketType::Unsuback,
            (12, 0) => PacketType::Pingreq,
            (13, 0) => PacketType::Pingresp,
            (14, 0) => PacketType::Disconnect,
            (15, 0) => PacketType::Auth,
            (_, flags) => return Err(DecodeError::InvalidFlags(flags)),
        };

        Ok(packet_type)
    }

    pub fn to_byte(&self) -> u8 {
        #[allow(clippy::identity_op)]
        match *self {
            PacketType::Connect => (1 << 4) | 0,
            PacketType::Connack => (2 << 4) | 0,
            PacketType::Publish { dup, qos, retain } => {
                let qos: u8 = qos.into();
                (3 << 4) | (dup as u8) << 3 | qos << 1 | retain as u8
            }
            PacketType::Puback => (4 << 4) | 0,
            PacketType::Pubrec => (5 << 4) | 0,
            PacketType::Pubrel => (6 << 4) | 0b0010,
            PacketType::Pubcomp => (7 << 4) | 0,
            PacketType::Subscribe => (8 << 4) | 0b0010,
            PacketType::Suback => (9 << 4) | 0,
            PacketType::Unsubscribe => (10 << 4) | 0b0010,
            PacketType::Unsuback => (11 << 4) | 0,
            PacketType::Pingreq => (12 << 4) | 0,
            PacketType::Pingresp => (13 << 4) | 0,
            PacketType::Disconnect => (14 << 4) | 0,
            PacketType::Auth => (15 << 4) | 0,
        }
    }
}

/// The fixed header every packet starts with
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FixedHeader {
    packet_type: PacketType,
    remaining_length: u32,
}

impl FixedHeader {
    pub fn new(packet_type: PacketType, remaining_length: u32) -> FixedHeader {
        FixedHeader {
            packet_type,
            remaining_length,
        }
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// The length of the packet body following this header
    pub fn remaining_length(&self) -> u32 {
        self.remaining_length
    }

    /// The encoded length of the header itself
    pub fn binary_size(&self) -> u32 {
        1 + variable_u32_binary_size(self.remaining_length)
    }

    pub fn parse<I>(input: &mut I) -> MResult<FixedHeader>
    where
        I: Stream<Token = u8> + StreamIsPartial,
    {
        trace("mqtt_fixed_header", |input: &mut I| {
            let byte = winnow::binary::u8(input)?;
            let packet_type = PacketType::from_byte(byte).map_err(ErrMode::Cut)?;
            let remaining_length = parse_variable_u32(input)?;

            Ok(FixedHeader {
                packet_type,
                remaining_length,
            })
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(self.packet_type.to_byte())?;
        write_variable_u32(buffer, self.remaining_length)
    }

    /// Assert that this header announces the type the caller expects
    pub fn require_type(&self, expected: PacketType) -> Result<(), DecodeError> {
        if self.packet_type == expected {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedMessageType)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use winnow::error::ErrMode;
    use winnow::Bytes;

    use super::FixedHeader;
    use super::PacketType;
    use crate::error::DecodeError;
    use crate::qos::QualityOfService;
    use crate::test::TestWriter;

    #[test]
    fn check_fixed_header() {
        let input = [0b0011_1010, 0x00];

        assert_eq!(
            FixedHeader::parse(&mut Bytes::new(&input)).unwrap(),
            FixedHeader::new(
                PacketType::Publish {
                    dup: true,
                    qos: QualityOfService::AtLeastOnce,
                    retain: false,
                },
                0
            )
        );
    }

    #[test]
    fn check_header_roundtrip() {
        let input = [0x10, 0x10];
        let header = FixedHeader::parse(&mut Bytes::new(&input)).unwrap();

        assert_eq!(header.packet_type(), PacketType::Connect);
        assert_eq!(header.remaining_length(), 16);
        assert_eq!(header.binary_size(), 2);

        let mut writer = TestWriter { buffer: Vec::new() };
        header.write(&mut writer).unwrap();
        assert_eq!(writer.buffer, input);
    }

    #[test]
    fn check_invalid_message_type() {
        let input = [0x00, 0x00];
        assert_eq!(
            FixedHeader::parse(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidMessageType(0))
        );
    }

    #[test]
    fn check_reserved_flags() {
        // SUBSCRIBE requires flags 0b0010
        let input = [0x80, 0x00];
        assert_eq!(
            FixedHeader::parse(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidFlags(0))
        );

        // PUBREL with QoS bits 0b00
        let input = [0x60, 0x00];
        FixedHeader::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn check_invalid_qos() {
        let input = [0b0011_0110, 0x00];
        assert_eq!(
            FixedHeader::parse(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidQualityOfService(3))
        );
    }

    #[test]
    fn check_require_type() {
        let header = FixedHeader::new(PacketType::Pingreq, 0);
        header.require_type(PacketType::Pingreq).unwrap();
        assert_eq!(
            header.require_type(PacketType::Connect).unwrap_err(),
            DecodeError::UnexpectedMessageType
        );
    }
}
