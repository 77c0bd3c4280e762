//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::stream::Stream;
use winnow::Bytes;
use winnow::Parser;

use super::connect_return::MConnectReturnCode;
use super::subscription_acks::MSubscriptionAcks;
use super::subscription_request::MSubscriptionRequests;
use super::unsubscription_request::MUnsubscriptionRequests;
use super::will::MLastWill;
use crate::boolean::parse_bool;
use crate::connect::validate_client_identifier;
use crate::connect::ConnectFlags;
use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::identifier::PacketIdentifier;
use crate::integers::fit_remaining_length;
use crate::level::parse_protocol_header;
use crate::level::write_protocol_header;
use crate::level::ProtocolLevel;
use crate::qos::QualityOfService;
use crate::topic::validate_topic_name;
use crate::write::PacketSize;
use crate::write::SliceWriter;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;
use crate::ParserSettings;

/// Read a packet identifier and nothing else
///
/// PUBACK, PUBREC, PUBREL, PUBCOMP and UNSUBACK all share this body.
pub(crate) fn parse_numbered(input: &mut &Bytes) -> MResult<PacketIdentifier> {
    let id = PacketIdentifier::parse(input)?;
    eof(input)?;
    Ok(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MConnect<'message> {
    pub clean_session: bool,
    pub will: Option<MLastWill<'message>>,
    pub username: Option<&'message str>,
    pub password: Option<&'message [u8]>,
    pub keep_alive: u16,
    pub client_id: &'message str,
}

impl<'message> MConnect<'message> {
    pub fn parse(
        settings: &ParserSettings,
        input: &mut &'message Bytes,
    ) -> MResult<MConnect<'message>> {
        trace("MConnect", |input: &mut &'message Bytes| {
            let level = parse_protocol_header(input)?;
            level.require(ProtocolLevel::V3).map_err(ErrMode::Cut)?;

            let flags = ConnectFlags::parse(input)?;
            let keep_alive = crate::integers::parse_u16(input)?;

            // Payload

            let client_id = crate::strings::parse_string(input)?;
            validate_client_identifier(client_id, settings).map_err(ErrMode::Cut)?;

            let will = if flags.will {
                let topic = crate::strings::parse_string(input)?;
                validate_topic_name(topic).map_err(ErrMode::Cut)?;
                let payload = crate::bytes::parse_binary_data(input)?;

                Some(MLastWill {
                    topic,
                    payload,
                    qos: flags.will_qos,
                    retain: flags.will_retain,
                })
            } else {
                None
            };

            let username = if flags.username {
                Some(crate::strings::parse_string(input)?)
            } else {
                None
            };

            let password = if flags.password {
                Some(crate::bytes::parse_binary_data(input)?)
            } else {
                None
            };

            eof(input)?;

            Ok(MConnect {
                clean_session: flags.clean_session,
                will,
                username,
                password,
                keep_alive,
                client_id,
            })
        })
        .parse_next(input)
    }

    fn connect_flags(&self) -> Result<ConnectFlags, EncodeError> {
        if self.password.is_some() && self.username.is_none() {
            return Err(EncodeError::InvalidPayload(DecodeError::InvalidConnectFlags));
        }

        Ok(ConnectFlags {
            username: self.username.is_some(),
            password: self.password.is_some(),
            will_retain: self.will.map(|w| w.retain).unwrap_or(false),
            will_qos: self
                .will
                .map(|w| w.qos)
                .unwrap_or(QualityOfService::AtMostOnce),
            will: self.will.is_some(),
            clean_session: self.clean_session,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        self.connect_flags()?;

        let mut size = 10u32; // protocol name and level, flags, keep alive
        size += crate::strings::string_binary_size(self.client_id)?;
        if let Some(will) = &self.will {
            size += will.binary_size()?;
        }
        if let Some(username) = self.username {
            size += crate::strings::string_binary_size(username)?;
        }
        if let Some(password) = self.password {
            size += crate::bytes::binary_data_binary_size(password)?;
        }

        Ok(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_protocol_header(buffer, ProtocolLevel::V3)?;
        buffer.write_byte(self.connect_flags()?.to_byte())?;
        buffer.write_u16(self.keep_alive)?;

        crate::strings::write_string(buffer, self.client_id)?;
        if let Some(will) = &self.will {
            will.write(buffer)?;
        }
        if let Some(username) = self.username {
            crate::strings::write_string(buffer, username)?;
        }
        if let Some(password) = self.password {
            crate::bytes::write_binary_data(buffer, password)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MConnack {
    pub session_present: bool,
    pub connect_return_code: MConnectReturnCode,
}

impl MConnack {
    pub fn parse(input: &mut &Bytes) -> MResult<MConnack> {
        let session_present = parse_bool(input)?;
        let connect_return_code = MConnectReturnCode::parse(input)?;

        // a session cannot be present on a rejected connection
        if session_present && connect_return_code != MConnectReturnCode::Accepted {
            return Err(ErrMode::Cut(DecodeError::InvalidConnack));
        }

        eof(input)?;

        Ok(MConnack {
            session_present,
            connect_return_code,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(2)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::boolean::write_bool(buffer, self.session_present)?;
        self.connect_return_code.write(buffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPublish<'message> {
    pub dup: bool,
    pub qos: QualityOfService,
    pub retain: bool,
    pub topic_name: &'message str,
    pub id: Option<PacketIdentifier>,
    pub payload: &'message [u8],
}

impl<'message> MPublish<'message> {
    pub fn parse(
        dup: bool,
        qos: QualityOfService,
        retain: bool,
        input: &mut &'message Bytes,
    ) -> MResult<MPublish<'message>> {
        trace("MPublish", |input: &mut &'message Bytes| {
            if dup && qos == QualityOfService::AtMostOnce {
                let qos_bits: u8 = qos.into();
                return Err(ErrMode::Cut(DecodeError::InvalidFlags(
                    0b1000 | qos_bits << 1 | retain as u8,
                )));
            }

            let topic_name = crate::strings::parse_string(input)?;
            validate_topic_name(topic_name).map_err(ErrMode::Cut)?;

            let id = if qos != QualityOfService::AtMostOnce {
                Some(PacketIdentifier::parse(input)?)
            } else {
                None
            };

            // the rest of the body is the application payload, opaque bytes
            let payload = input.finish();

            Ok(MPublish {
                dup,
                qos,
                retain,
                topic_name,
                id,
                payload,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if (self.qos == QualityOfService::AtMostOnce) != self.id.is_none() {
            return Err(EncodeError::InvalidPacketIdentifier);
        }

        let size = crate::strings::string_binary_size(self.topic_name)? as u64
            + self.id.map(|id| id.binary_size()).unwrap_or(0) as u64
            + self.payload.len() as u64;

        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::strings::write_string(buffer, self.topic_name)?;
        if let Some(id) = &self.id {
            id.write(buffer)?;
        }
        buffer.write_slice(self.payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPuback {
    pub id: PacketIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPubrec {
    pub id: PacketIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPubrel {
    pub id: PacketIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPubcomp {
    pub id: PacketIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MUnsuback {
    pub id: PacketIdentifier,
}

macro_rules! impl_numbered_packet {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub fn parse(input: &mut &Bytes) -> MResult<$name> {
                    parse_numbered(input).map(|id| $name { id })
                }

                pub fn binary_size(&self) -> Result<u32, EncodeError> {
                    Ok(self.id.binary_size())
                }

                pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                    self.id.write(buffer)
                }
            }
        )*
    };
}

impl_numbered_packet!(MPuback, MPubrec, MPubrel, MPubcomp, MUnsuback);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MSubscribe<'message> {
    pub id: PacketIdentifier,
    pub subscriptions: MSubscriptionRequests<'message>,
}

impl<'message> MSubscribe<'message> {
    pub fn parse(input: &mut &'message Bytes) -> MResult<MSubscribe<'message>> {
        let id = PacketIdentifier::parse(input)?;
        let subscriptions = MSubscriptionRequests::parse(input)?;

        Ok(MSubscribe { id, subscriptions })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(self.id.binary_size() + self.subscriptions.binary_size()?)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.id.write(buffer)?;
        self.subscriptions.write(buffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MSuback<'message> {
    pub id: PacketIdentifier,
    pub subscription_acks: MSubscriptionAcks<'message>,
}

impl<'message> MSuback<'message> {
    pub fn parse(input: &mut &'message Bytes) -> MResult<MSuback<'message>> {
        let id = PacketIdentifier::parse(input)?;
        let subscription_acks = MSubscriptionAcks::parse(input)?;

        Ok(MSuback {
            id,
            subscription_acks,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(self.id.binary_size() + self.subscription_acks.binary_size()?)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.id.write(buffer)?;
        self.subscription_acks.write(buffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MUnsubscribe<'message> {
    pub id: PacketIdentifier,
    pub unsubscriptions: MUnsubscriptionRequests<'message>,
}

impl<'message> MUnsubscribe<'message> {
    pub fn parse(input: &mut &'message Bytes) -> MResult<MUnsubscribe<'message>> {
        let id = PacketIdentifier::parse(input)?;
        let unsubscriptions = MUnsubscriptionRequests::parse(input)?;

        Ok(MUnsubscribe {
            id,
            unsubscriptions,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(self.id.binary_size() + self.unsubscriptions.binary_size()?)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.id.write(buffer)?;
        self.unsubscriptions.write(buffer)
    }
}

macro_rules! impl_empty_packet {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl $name {
                pub fn parse(input: &mut &Bytes) -> MResult<$name> {
                    eof(input)?;
                    Ok($name)
                }

                pub fn binary_size(&self) -> Result<u32, EncodeError> {
                    Ok(0)
                }

                pub fn write<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
                    Ok(())
                }
            }
        )*
    };
}

impl_empty_packet!(MPingreq, MPingresp, MDisconnect);

/// Any 3.1.1 control packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MPacket<'message> {
    Connect(MConnect<'message>),
    Connack(MConnack),
    Publish(MPublish<'message>),
    Puback(MPuback),
    Pubrec(MPubrec),
    Pubrel(MPubrel),
    Pubcomp(MPubcomp),
    Subscribe(MSubscribe<'message>),
    Suback(MSuback<'message>),
    Unsubscribe(MUnsubscribe<'message>),
    Unsuback(MUnsuback),
    Pingreq(MPingreq),
    Pingresp(MPingresp),
    Disconnect(MDisconnect),
}

macro_rules! impl_packet_conversion {
    ($($var:ident => $kind:ty),* $(,)?) => {
        $(
            impl<'message> From<$kind> for MPacket<'message> {
                fn from(v: $kind) -> Self {
                    Self::$var(v)
                }
            }

            impl<'message> TryFrom<MPacket<'message>> for $kind {
                type Error = DecodeError;

                fn try_from(value: MPacket<'message>) -> Result<Self, Self::Error> {
                    if let MPacket::$var(var) = value {
                        Ok(var)
                    } else {
                        Err(DecodeError::UnexpectedMessageType)
                    }
                }
            }
        )*
    };
}

impl_packet_conversion!(
    Connect => MConnect<'message>,
    Connack => MConnack,
    Publish => MPublish<'message>,
    Puback => MPuback,
    Pubrec => MPubrec,
    Pubrel => MPubrel,
    Pubcomp => MPubcomp,
    Subscribe => MSubscribe<'message>,
    Suback => MSuback<'message>,
    Unsubscribe => MUnsubscribe<'message>,
    Unsuback => MUnsuback,
    Pingreq => MPingreq,
    Pingresp => MPingresp,
    Disconnect => MDisconnect,
);

impl<'message> MPacket<'message> {
    /// Parse one whole packet, fixed header included
    ///
    /// Leaves anything after the packet in `input`.
    pub fn parse(
        settings: &ParserSettings,
        input: &mut &'message Bytes,
    ) -> MResult<MPacket<'message>> {
        let header = FixedHeader::parse(input)?;

        let remaining = usize::try_from(header.remaining_length())
            .map_err(|_| ErrMode::Cut(DecodeError::PacketTooLarge))?;
        let body: &[u8] = winnow::token::take(remaining).parse_next(input)?;

        Self::parse_body(&header, settings, &mut Bytes::new(body))
    }

    /// Parse the body a [`crate::streaming::StreamingDecoder`] carved off
    pub fn parse_body(
        header: &FixedHeader,
        settings: &ParserSettings,
        input: &mut &'message Bytes,
    ) -> MResult<MPacket<'message>> {
        match header.packet_type() {
            PacketType::Connect => MConnect::parse(settings, input).map(MPacket::from),
            PacketType::Connack => MConnack::parse(input).map(MPacket::from),
            PacketType::Publish { dup, qos, retain } => {
                MPublish::parse(dup, qos, retain, input).map(MPacket::from)
            }
            PacketType::Puback => MPuback::parse(input).map(MPacket::from),
            PacketType::Pubrec => MPubrec::parse(input).map(MPacket::from),
            PacketType::Pubrel => MPubrel::parse(input).map(MPacket::from),
            PacketType::Pubcomp => MPubcomp::parse(input).map(MPacket::from),
            PacketType::Subscribe => MSubscribe::parse(input).map(MPacket::from),
            PacketType::Suback => MSuback::parse(input).map(MPacket::from),
            PacketType::Unsubscribe => MUnsubscribe::parse(input).map(MPacket::from),
            PacketType::Unsuback => MUnsuback::parse(input).map(MPacket::from),
            PacketType::Pingreq => MPingreq::parse(input).map(MPacket::from),
            PacketType::Pingresp => MPingresp::parse(input).map(MPacket::from),
            PacketType::Disconnect => MDisconnect::parse(input).map(MPacket::from),
            // AUTH only exists from protocol level 5 on
            PacketType::Auth => Err(ErrMode::Cut(DecodeError::InvalidMessageType(15))),
        }
    }

    /// Parse a buffer that holds exactly one packet
    pub fn parse_complete(
        settings: &ParserSettings,
        buffer: &'message [u8],
    ) -> Result<MPacket<'message>, DecodeError> {
        let mut input = Bytes::new(buffer);
        let packet = Self::parse(settings, &mut input)?;

        if !input.is_empty() {
            return Err(DecodeError::PacketLengthMismatch);
        }

        Ok(packet)
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            MPacket::Connect(_) => PacketType::Connect,
            MPacket::Connack(_) => PacketType::Connack,
            MPacket::Publish(p) => PacketType::Publish {
                dup: p.dup,
                qos: p.qos,
                retain: p.retain,
            },
            MPacket::Puback(_) => PacketType::Puback,
            MPacket::Pubrec(_) => PacketType::Pubrec,
            MPacket::Pubrel(_) => PacketType::Pubrel,
            MPacket::Pubcomp(_) => PacketType::Pubcomp,
            MPacket::Subscribe(_) => PacketType::Subscribe,
            MPacket::Suback(_) => PacketType::Suback,
            MPacket::Unsubscribe(_) => PacketType::Unsubscribe,
            MPacket::Unsuback(_) => PacketType::Unsuback,
            MPacket::Pingreq(_) => PacketType::Pingreq,
            MPacket::Pingresp(_) => PacketType::Pingresp,
            MPacket::Disconnect(_) => PacketType::Disconnect,
        }
    }

    /// The validation and sizing pass of the encoder
    pub fn validate(&self) -> Result<PacketSize, EncodeError> {
        let remaining_length = match self {
            MPacket::Connect(p) => p.binary_size()?,
            MPacket::Connack(p) => p.binary_size()?,
            MPacket::Publish(p) => p.binary_size()?,
            MPacket::Puback(p) => p.binary_size()?,
            MPacket::Pubrec(p) => p.binary_size()?,
            MPacket::Pubrel(p) => p.binary_size()?,
            MPacket::Pubcomp(p) => p.binary_size()?,
            MPacket::Subscribe(p) => p.binary_size()?,
            MPacket::Suback(p) => p.binary_size()?,
            MPacket::Unsubscribe(p) => p.binary_size()?,
            MPacket::Unsuback(p) => p.binary_size()?,
            MPacket::Pingreq(p) => p.binary_size()?,
            MPacket::Pingresp(p) => p.binary_size()?,
            MPacket::Disconnect(p) => p.binary_size()?,
        };

        Ok(PacketSize::new(remaining_length))
    }

    /// The write pass of the encoder
    ///
    /// `size` must come from [`MPacket::validate`] on the same packet; the
    /// write emits exactly [`PacketSize::total`] bytes.
    pub fn write<W: WriteMqttPacket>(&self, size: PacketSize, buffer: &mut W) -> WResult<W> {
        FixedHeader::new(self.packet_type(), size.remaining_length()).write(buffer)?;

        match self {
            MPacket::Connect(p) => p.write(buffer),
            MPacket::Connack(p) => p.write(buffer),
            MPacket::Publish(p) => p.write(buffer),
            MPacket::Puback(p) => p.write(buffer),
            MPacket::Pubrec(p) => p.write(buffer),
            MPacket::Pubrel(p) => p.write(buffer),
            MPacket::Pubcomp(p) => p.write(buffer),
            MPacket::Subscribe(p) => p.write(buffer),
            MPacket::Suback(p) => p.write(buffer),
            MPacket::Unsubscribe(p) => p.write(buffer),
            MPacket::Unsuback(p) => p.write(buffer),
            MPacket::Pingreq(p) => p.write(buffer),
            MPacket::Pingresp(p) => p.write(buffer),
            MPacket::Disconnect(p) => p.write(buffer),
        }
    }

    /// Validate and write in one go, into a caller-provided buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let size = self.validate()?;
        let total = size.buffer_len()?;

        let mut writer = SliceWriter::new(buffer);
        self.write(size, &mut writer)?;
        debug_assert_eq!(writer.written(), total);

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU16;

    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use super::MConnack;
    use super::MConnect;
    use super::MDisconnect;
    use super::MPacket;
    use super::MPublish;
    use super::MSubscribe;
    use crate::error::DecodeError;
    use crate::identifier::PacketIdentifier;
    use crate::qos::QualityOfService;
    use crate::test::TestWriter;
    use crate::v3::connect_return::MConnectReturnCode;
    use crate::v3::subscription_request::MSubscriptionRequests;
    use crate::v3::will::MLastWill;
    use crate::ParserSettings;

    fn settings() -> ParserSettings {
        ParserSettings::default()
    }

    #[test]
    fn check_complete_length() {
        let input = &[0b1110_0000, 0b0000_0000];

        let disc = MPacket::parse_complete(&settings(), input).unwrap();
        assert_eq!(disc, MPacket::Disconnect(MDisconnect));
    }

    #[test]
    fn check_connect_decode() {
        let input = &[
            0x10, 0x10, 0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x04, 0x02, 0x00, 0x3C, 0x00, 0x04,
            0x44, 0x49, 0x47, 0x49,
        ];

        let connect = MPacket::parse_complete(&settings(), input).unwrap();

        assert_eq!(
            connect,
            MPacket::Connect(MConnect {
                clean_session: true,
                will: None,
                username: None,
                password: None,
                keep_alive: 60,
                client_id: "DIGI",
            })
        );

        let strict = ParserSettings {
            strict_client_identifier: true,
        };
        MPacket::parse_complete(&strict, input).unwrap();
    }

    #[test]
    fn check_will_consistency() {
        let input = &[
            0b0001_0000,
            17,
            0x0,
            0x4, // String length
            b'M',
            b'Q',
            b'T',
            b'T',
            0x4,         // Level
            0b0000_1000, // Connect flags, with Will QoS = 1 and will flag = 0
            0x0,
            0x10, // Keep Alive in secs
            0x0,  // Client Identifier
            0x5,
            b'H',
            b'E',
            b'L',
            b'L',
            b'O',
        ];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::InvalidConnectFlags
        );
    }

    #[test]
    fn check_connect_roundtrip() {
        let input = &[
            0b0001_0000,
            37,
            0x0,
            0x4, // String length
            b'M',
            b'Q',
            b'T',
            b'T',
            0x4,         // Level
            0b1111_0110, // Connect flags
            0x0,
            0x10, // Keep Alive in secs
            0x0,  // Client Identifier
            0x5,
            b'H',
            b'E',
            b'L',
            b'L',
            b'O',
            0x0, // Will Topic
            0x5,
            b'W',
            b'O',
            b'R',
            b'L',
            b'D',
            0x0, // Will Payload
            0x1,
            0xFF,
            0x0,
            0x5, // Username
            b'A',
            b'D',
            b'M',
            b'I',
            b'N',
            0x0,
            0x1, // Password
            0xF0,
        ];

        let conn = MPacket::parse_complete(&settings(), input).unwrap();

        assert_eq!(
            conn,
            MPacket::Connect(MConnect {
                clean_session: true,
                will: Some(MLastWill {
                    topic: "WORLD",
                    payload: &[0xFF],
                    qos: QualityOfService::ExactlyOnce,
                    retain: true,
                }),
                username: Some("ADMIN"),
                password: Some(&[0xF0]),
                keep_alive: 16,
                client_id: "HELLO",
            })
        );

        let size = conn.validate().unwrap();
        assert_eq!(size.buffer_len().unwrap(), input.len());

        let mut writer = TestWriter { buffer: Vec::new() };
        conn.write(size, &mut writer).unwrap();
        assert_eq!(&writer.buffer[..], &input[..]);
    }

    #[test]
    fn check_connack_decode() {
        let input = &[0x20, 0x02, 0x01, 0x00];

        let connack = MPacket::parse_complete(&settings(), input).unwrap();
        assert_eq!(
            connack,
            MPacket::Connack(MConnack {
                session_present: true,
                connect_return_code: MConnectReturnCode::Accepted,
            })
        );
    }

    #[test]
    fn check_connack_session_consistency() {
        // session present, but the connection was rejected
        let input = &[0x20, 0x02, 0x01, 0x05];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::InvalidConnack
        );
    }

    #[test]
    fn check_publish_qos0_decode() {
        let input = &[
            0x30, 0x0A, 0x00, 0x04, 0x74, 0x65, 0x73, 0x74, 0x74, 0x65, 0x73, 0x74,
        ];

        let publish = MPacket::parse_complete(&settings(), input).unwrap();
        assert_eq!(
            publish,
            MPacket::Publish(MPublish {
                dup: false,
                qos: QualityOfService::AtMostOnce,
                retain: false,
                topic_name: "test",
                id: None,
                payload: b"test",
            })
        );
    }

    #[test]
    fn check_publish_qos2_roundtrip() {
        let input = &[
            0x34, 0x14, 0x00, 0x05, 0x61, 0x2F, 0x62, 0x2F, 0x63, 0x00, 0x01, 0x68, 0x65, 0x6C,
            0x6C, 0x6F, 0x20, 0x77, 0x6F, 0x72, 0x6C, 0x64,
        ];

        let publish = MPacket::parse_complete(&settings(), input).unwrap();
        assert_eq!(
            publish,
            MPacket::Publish(MPublish {
                dup: false,
                qos: QualityOfService::ExactlyOnce,
                retain: false,
                topic_name: "a/b/c",
                id: Some(PacketIdentifier(NonZeroU16::new(1).unwrap())),
                payload: b"hello world",
            })
        );

        let mut out = [0u8; 22];
        let written = publish.encode_into(&mut out).unwrap();
        assert_eq!(&out[..written], &input[..]);
    }

    #[test]
    fn check_publish_qos0_with_dup() {
        let input = &[
            0x38, 0x0A, 0x00, 0x04, 0x74, 0x65, 0x73, 0x74, 0x74, 0x65, 0x73, 0x74,
        ];

        MPacket::parse_complete(&settings(), input).unwrap_err();
    }

    #[test]
    fn check_publish_wildcard_topic() {
        let input = &[0x30, 0x05, 0x00, 0x03, 0x61, 0x2F, 0x23];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::WildcardInTopic
        );
    }

    #[test]
    fn check_numbered_packets() {
        for (type_byte, expected) in [
            (0x40u8, "puback"),
            (0x50, "pubrec"),
            (0x62, "pubrel"),
            (0x70, "pubcomp"),
            (0xB0, "unsuback"),
        ] {
            let input = &[type_byte, 0x02, 0x12, 0x34];
            let packet = MPacket::parse_complete(&settings(), input)
                .unwrap_or_else(|e| panic!("{expected} failed to parse: {e}"));

            let mut out = [0u8; 4];
            let written = packet.encode_into(&mut out).unwrap();
            assert_eq!(&out[..written], &input[..], "{expected} did not roundtrip");
        }
    }

    #[test]
    fn check_zero_packet_identifier() {
        let input = &[0x40, 0x02, 0x00, 0x00];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::InvalidPacketIdentifier
        );
    }

    #[test]
    fn check_subscribe_roundtrip() {
        let input = &[
            0x82, 0x09, 0x00, 0x01, // packet identifier
            0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x02, // "MQTT", QoS 2
        ];

        let subscribe = MPacket::parse_complete(&settings(), input).unwrap();
        assert_eq!(
            subscribe,
            MPacket::Subscribe(MSubscribe {
                id: PacketIdentifier(NonZeroU16::new(1).unwrap()),
                subscriptions: MSubscriptionRequests::new(&input[4..]),
            })
        );

        let mut out = [0u8; 11];
        let written = subscribe.encode_into(&mut out).unwrap();
        assert_eq!(&out[..written], &input[..]);
    }

    #[test]
    fn check_empty_subscribe_rejected() {
        let input = &[0x82, 0x02, 0x00, 0x01];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::PacketLengthMismatch
        );
    }

    #[test]
    fn check_auth_is_not_v3() {
        let input = &[0xF0, 0x00];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::InvalidMessageType(15)
        );
    }

    #[test]
    fn check_trailing_bytes_rejected() {
        // a DISCONNECT that claims one body byte too many
        let input = &[0xE0, 0x01, 0x00];

        assert_eq!(
            MPacket::parse_complete(&settings(), input).unwrap_err(),
            DecodeError::PacketLengthMismatch
        );
    }
}
