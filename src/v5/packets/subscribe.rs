//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::error::ErrMode;
use winnow::stream::Stream;
use winnow::Bytes;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::identifier::PacketIdentifier;
use crate::integers::fit_remaining_length;
use crate::qos::qos_from_bits;
use crate::qos::QualityOfService;
use crate::topic::validate_topic_filter;
use crate::v5::properties::define_properties;
use crate::v5::variable_header::SubscriptionIdentifiers;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

define_properties! {
    pub struct SubscribeProperties<'i> {
        subscription_identifiers: SubscriptionIdentifiers<'i>,
        user_properties: UserProperties<'i>,
    }
}

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainHandling {
    SendRetainedMessagesAlways = 0,
    SendRetainedMessagesOnNewSubscribe = 1,
    DoNotSendRetainedMessages = 2,
}

/// The option byte that follows every topic filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionOptions {
    pub quality_of_service: QualityOfService,
    pub no_local: bool,
    pub retain_as_published: bool,
    pub retain_handling: RetainHandling,
}

impl SubscriptionOptions {
    fn parse(input: &mut &Bytes) -> MResult<SubscriptionOptions> {
        let byte = winnow::binary::u8(input)?;

        // bits 7-6 are reserved
        if byte & 0b1100_0000 != 0 {
            return Err(ErrMode::Cut(DecodeError::InvalidFlags(byte)));
        }

        let quality_of_service = qos_from_bits(byte & 0b0000_0011).map_err(ErrMode::Cut)?;
        let retain_handling = RetainHandling::try_from((byte & 0b0011_0000) >> 4)
            .map_err(|_| ErrMode::Cut(DecodeError::InvalidFlags(byte)))?;

        Ok(SubscriptionOptions {
            quality_of_service,
            no_local: byte & 0b0000_0100 != 0,
            retain_as_published: byte & 0b0000_1000 != 0,
            retain_handling,
        })
    }

    fn to_byte(self) -> u8 {
        let qos: u8 = self.quality_of_service.into();
        let retain_handling: u8 = self.retain_handling.into();

        qos | (self.no_local as u8) << 2
            | (self.retain_as_published as u8) << 3
            | retain_handling << 4
    }
}

/// One (topic filter, options) pair of a SUBSCRIBE payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription<'i> {
    pub topic_filter: &'i str,
    pub options: SubscriptionOptions,
}

impl<'i> Subscription<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<Subscription<'i>> {
        let topic_filter = crate::strings::parse_string(input)?;
        validate_topic_filter(topic_filter).map_err(ErrMode::Cut)?;

        let options = SubscriptionOptions::parse(input)?;

        Ok(Subscription {
            topic_filter,
            options,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(crate::strings::string_binary_size(self.topic_filter)? + 1)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::strings::write_string(buffer, self.topic_filter)?;
        buffer.write_byte(self.options.to_byte())
    }
}

/// The non-empty subscription list of a SUBSCRIBE packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscriptions<'i> {
    block: &'i [u8],
}

impl<'i> Subscriptions<'i> {
    pub fn new(block: &'i [u8]) -> Subscriptions<'i> {
        Subscriptions { block }
    }

    pub fn as_bytes(&self) -> &'i [u8] {
        self.block
    }

    pub fn parse(input: &mut &'i Bytes) -> MResult<Subscriptions<'i>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            Subscription::parse(&mut check)?;
        }

        Ok(Subscriptions { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            Subscription::parse(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> SubscriptionsIter<'i> {
        SubscriptionsIter {
            current: Bytes::new(self.block),
        }
    }
}

impl<'i> IntoIterator for Subscriptions<'i> {
    type Item = Subscription<'i>;
    type IntoIter = SubscriptionsIter<'i>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionsIter<'i> {
    current: &'i Bytes,
}

impl<'i> Iterator for SubscriptionsIter<'i> {
    type Item = Subscription<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let subscription = Subscription::parse(&mut self.current)
            .expect("subscription block was validated when it was parsed");

        Some(subscription)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901161")]
pub struct MSubscribe<'i> {
    pub packet_identifier: PacketIdentifier,
    pub properties: SubscribeProperties<'i>,
    pub subscriptions: Subscriptions<'i>,
}

impl<'i> MSubscribe<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MSubscribe<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;
        let properties = SubscribeProperties::parse(input)?;
        let subscriptions = Subscriptions::parse(input)?;

        Ok(MSubscribe {
            packet_identifier,
            properties,
            subscriptions,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        let size = self.packet_identifier.binary_size() as u64
            + self.properties.binary_size()? as u64
            + self.subscriptions.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)?;
        self.subscriptions.write(buffer)
    }
}
