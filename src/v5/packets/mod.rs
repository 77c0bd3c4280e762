//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::error::ErrMode;
use winnow::Bytes;
use winnow::Parser;

use self::auth::MAuth;
use self::connack::MConnack;
use self::connect::MConnect;
use self::disconnect::MDisconnect;
use self::pingreq::MPingreq;
use self::pingresp::MPingresp;
use self::puback::MPuback;
use self::pubcomp::MPubcomp;
use self::publish::MPublish;
use self::pubrec::MPubrec;
use self::pubrel::MPubrel;
use self::suback::MSuback;
use self::subscribe::MSubscribe;
use self::unsuback::MUnsuback;
use self::unsubscribe::MUnsubscribe;
use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::write::PacketSize;
use crate::write::SliceWriter;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;
use crate::ParserSettings;

pub mod auth;
pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod pingreq;
pub mod pingresp;
pub mod puback;
pub mod pubcomp;
pub mod publish;
pub mod pubrec;
pub mod pubrel;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

/// Any 5.0 control packet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MqttPacket<'i> {
    Auth(MAuth<'i>),
    Connack(MConnack<'i>),
    Connect(MConnect<'i>),
    Disconnect(MDisconnect<'i>),
    Pingreq(MPingreq),
    Pingresp(MPingresp),
    Puback(MPuback<'i>),
    Pubcomp(MPubcomp<'i>),
    Publish(MPublish<'i>),
    Pubrec(MPubrec<'i>),
    Pubrel(MPubrel<'i>),
    Suback(MSuback<'i>),
    Subscribe(MSubscribe<'i>),
    Unsuback(MUnsuback<'i>),
    Unsubscribe(MUnsubscribe<'i>),
}

macro_rules! impl_packet_conversion {
    ($($kind:ty => $name:ident),* $(,)?) => {
        $(
            impl<'i> From<$kind> for MqttPacket<'i> {
                fn from(from: $kind) -> Self {
                    MqttPacket::$name(from)
                }
            }

            impl<'i> TryFrom<MqttPacket<'i>> for $kind {
                type Error = DecodeError;

                fn try_from(value: MqttPacket<'i>) -> Result<Self, Self::Error> {
                    if let MqttPacket::$name(packet) = value {
                        Ok(packet)
                    } else {
                        Err(DecodeError::UnexpectedMessageType)
                    }
                }
            }
        )*
    };
}

impl_packet_conversion!(
    MAuth<'i> => Auth,
    MConnack<'i> => Connack,
    MConnect<'i> => Connect,
    MDisconnect<'i> => Disconnect,
    MPingreq => Pingreq,
    MPingresp => Pingresp,
    MPuback<'i> => Puback,
    MPubcomp<'i> => Pubcomp,
    MPublish<'i> => Publish,
    MPubrec<'i> => Pubrec,
    MPubrel<'i> => Pubrel,
    MSuback<'i> => Suback,
    MSubscribe<'i> => Subscribe,
    MUnsuback<'i> => Unsuback,
    MUnsubscribe<'i> => Unsubscribe,
);

impl<'i> MqttPacket<'i> {
    /// Parse one whole packet, fixed header included
    ///
    /// Leaves anything after the packet in `input`.
    pub fn parse(
        settings: &ParserSettings,
        input: &mut &'i Bytes,
    ) -> MResult<MqttPacket<'i>> {
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
        input: &mut &'i Bytes,
    ) -> MResult<MqttPacket<'i>> {
        match header.packet_type() {
            PacketType::Connect => MConnect::parse(settings, input).map(MqttPacket::from),
            PacketType::Connack => MConnack::parse(input).map(MqttPacket::from),
            PacketType::Publish { dup, qos, retain } => {
                MPublish::parse(dup, qos, retain, input).map(MqttPacket::from)
            }
            PacketType::Puback => MPuback::parse(input).map(MqttPacket::from),
            PacketType::Pubrec => MPubrec::parse(input).map(MqttPacket::from),
            PacketType::Pubrel => MPubrel::parse(input).map(MqttPacket::from),
            PacketType::Pubcomp => MPubcomp::parse(input).map(MqttPacket::from),
            PacketType::Subscribe => MSubscribe::parse(input).map(MqttPacket::from),
            PacketType::Suback => MSuback::parse(input).map(MqttPacket::from),
            PacketType::Unsubscribe => MUnsubscribe::parse(input).map(MqttPacket::from),
            PacketType::Unsuback => MUnsuback::parse(input).map(MqttPacket::from),
            PacketType::Pingreq => MPingreq::parse(input).map(MqttPacket::from),
            PacketType::Pingresp => MPingresp::parse(input).map(MqttPacket::from),
            PacketType::Disconnect => MDisconnect::parse(input).map(MqttPacket::from),
            PacketType::Auth => MAuth::parse(input).map(MqttPacket::from),
        }
    }

    /// Parse a buffer that holds exactly one packet
    pub fn parse_complete(
        settings: &ParserSettings,
        buffer: &'i [u8],
    ) -> Result<MqttPacket<'i>, DecodeError> {
        let mut input = Bytes::new(buffer);
        let packet = Self::parse(settings, &mut input)?;

        if !input.is_empty() {
            return Err(DecodeError::PacketLengthMismatch);
        }

        Ok(packet)
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            MqttPacket::Auth(_) => PacketType::Auth,
            MqttPacket::Connack(_) => PacketType::Connack,
            MqttPacket::Connect(_) => PacketType::Connect,
            MqttPacket::Disconnect(_) => PacketType::Disconnect,
            MqttPacket::Pingreq(_) => PacketType::Pingreq,
            MqttPacket::Pingresp(_) => PacketType::Pingresp,
            MqttPacket::Puback(_) => PacketType::Puback,
            MqttPacket::Pubcomp(_) => PacketType::Pubcomp,
            MqttPacket::Publish(p) => PacketType::Publish {
                dup: p.dup,
                qos: p.qos,
                retain: p.retain,
            },
            MqttPacket::Pubrec(_) => PacketType::Pubrec,
            MqttPacket::Pubrel(_) => PacketType::Pubrel,
            MqttPacket::Suback(_) => PacketType::Suback,
            MqttPacket::Subscribe(_) => PacketType::Subscribe,
            MqttPacket::Unsuback(_) => PacketType::Unsuback,
            MqttPacket::Unsubscribe(_) => PacketType::Unsubscribe,
        }
    }

    /// The validation and sizing pass of the encoder
    pub fn validate(&self) -> Result<PacketSize, EncodeError> {
        let remaining_length = match self {
            MqttPacket::Auth(p) => p.binary_size()?,
            MqttPacket::Connack(p) => p.binary_size()?,
            MqttPacket::Connect(p) => p.binary_size()?,
            MqttPacket::Disconnect(p) => p.binary_size()?,
            MqttPacket::Pingreq(p) => p.binary_size()?,
            MqttPacket::Pingresp(p) => p.binary_size()?,
            MqttPacket::Puback(p) => p.binary_size()?,
            MqttPacket::Pubcomp(p) => p.binary_size()?,
            MqttPacket::Publish(p) => p.binary_size()?,
            MqttPacket::Pubrec(p) => p.binary_size()?,
            MqttPacket::Pubrel(p) => p.binary_size()?,
            MqttPacket::Suback(p) => p.binary_size()?,
            MqttPacket::Subscribe(p) => p.binary_size()?,
            MqttPacket::Unsuback(p) => p.binary_size()?,
            MqttPacket::Unsubscribe(p) => p.binary_size()?,
        };

        Ok(PacketSize::new(remaining_length))
    }

    /// The write pass of the encoder
    ///
    /// `size` must come from [`MqttPacket::validate`] on the same packet;
    /// the write emits exactly [`PacketSize::total`] bytes.
    pub fn write<W: WriteMqttPacket>(&self, size: PacketSize, buffer: &mut W) -> WResult<W> {
        FixedHeader::new(self.packet_type(), size.remaining_length()).write(buffer)?;

        match self {
            MqttPacket::Auth(p) => p.write(buffer),
            MqttPacket::Connack(p) => p.write(buffer),
            MqttPacket::Connect(p) => p.write(buffer),
            MqttPacket::Disconnect(p) => p.write(buffer),
            MqttPacket::Pingreq(p) => p.write(buffer),
            MqttPacket::Pingresp(p) => p.write(buffer),
            MqttPacket::Puback(p) => p.write(buffer),
            MqttPacket::Pubcomp(p) => p.write(buffer),
            MqttPacket::Publish(p) => p.write(buffer),
            MqttPacket::Pubrec(p) => p.write(buffer),
            MqttPacket::Pubrel(p) => p.write(buffer),
            MqttPacket::Suback(p) => p.write(buffer),
            MqttPacket::Subscribe(p) => p.write(buffer),
            MqttPacket::Unsuback(p) => p.write(buffer),
            MqttPacket::Unsubscribe(p) => p.write(buffer),
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
