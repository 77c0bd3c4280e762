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
use crate::topic::validate_topic_filter;
use crate::v5::properties::define_properties;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

define_properties! {
    pub struct UnsubscribeProperties<'i> {
        user_properties: UserProperties<'i>,
    }
}

fn parse_filter<'i>(input: &mut &'i Bytes) -> MResult<&'i str> {
    let topic_filter = crate::strings::parse_string(input)?;
    validate_topic_filter(topic_filter).map_err(ErrMode::Cut)?;
    Ok(topic_filter)
}

/// The non-empty topic filter list of an UNSUBSCRIBE packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsubscriptions<'i> {
    block: &'i [u8],
}

impl<'i> Unsubscriptions<'i> {
    pub fn new(block: &'i [u8]) -> Unsubscriptions<'i> {
        Unsubscriptions { block }
    }

    pub fn parse(input: &mut &'i Bytes) -> MResult<Unsubscriptions<'i>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            parse_filter(&mut check)?;
        }

        Ok(Unsubscriptions { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            parse_filter(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> UnsubscriptionsIter<'i> {
        UnsubscriptionsIter {
            current: Bytes::new(self.block),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnsubscriptionsIter<'i> {
    current: &'i Bytes,
}

impl<'i> Iterator for UnsubscriptionsIter<'i> {
    type Item = &'i str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let filter = parse_filter(&mut self.current)
            .expect("unsubscription block was validated when it was parsed");

        Some(filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901179")]
pub struct MUnsubscribe<'i> {
    pub packet_identifier: PacketIdentifier,
    pub properties: UnsubscribeProperties<'i>,
    pub unsubscriptions: Unsubscriptions<'i>,
}

impl<'i> MUnsubscribe<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MUnsubscribe<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;
        let properties = UnsubscribeProperties::parse(input)?;
        let unsubscriptions = Unsubscriptions::parse(input)?;

        Ok(MUnsubscribe {
            packet_identifier,
            properties,
            unsubscriptions,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        let size = self.packet_identifier.binary_size() as u64
            + self.properties.binary_size()? as u64
            + self.unsubscriptions.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)?;
        self.unsubscriptions.write(buffer)
    }
}
