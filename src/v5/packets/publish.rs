//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::stream::Stream;
use winnow::Bytes;
use winnow::Parser;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::identifier::PacketIdentifier;
use crate::integers::fit_remaining_length;
use crate::qos::QualityOfService;
use crate::topic::validate_topic_name;
use crate::v5::properties::define_properties;
use crate::v5::variable_header::ContentType;
use crate::v5::variable_header::CorrelationData;
use crate::v5::variable_header::MessageExpiryInterval;
use crate::v5::variable_header::PayloadFormatIndicator;
use crate::v5::variable_header::ResponseTopic;
use crate::v5::variable_header::SubscriptionIdentifiers;
use crate::v5::variable_header::TopicAlias;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

define_properties! {
    pub struct PublishProperties<'i> {
        payload_format_indicator: PayloadFormatIndicator,
        message_expiry_interval: MessageExpiryInterval,
        topic_alias: TopicAlias,
        response_topic: ResponseTopic<'i>,
        correlation_data: CorrelationData<'i>,
        user_properties: UserProperties<'i>,
        subscription_identifiers: SubscriptionIdentifiers<'i>,
        content_type: ContentType<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901100")]
pub struct MPublish<'i> {
    pub dup: bool,
    pub qos: QualityOfService,
    pub retain: bool,
    pub topic_name: &'i str,
    pub packet_identifier: Option<PacketIdentifier>,
    pub properties: PublishProperties<'i>,
    pub payload: &'i [u8],
}

impl<'i> MPublish<'i> {
    pub fn parse(
        dup: bool,
        qos: QualityOfService,
        retain: bool,
        input: &mut &'i Bytes,
    ) -> MResult<MPublish<'i>> {
        trace("MPublish", |input: &mut &'i Bytes| {
            if dup && qos == QualityOfService::AtMostOnce {
                let qos_bits: u8 = qos.into();
                return Err(ErrMode::Cut(DecodeError::InvalidFlags(
                    0b1000 | qos_bits << 1 | retain as u8,
                )));
            }

            let topic_name = crate::strings::parse_string(input)?;
            validate_topic_name(topic_name).map_err(ErrMode::Cut)?;

            let packet_identifier = if qos != QualityOfService::AtMostOnce {
                Some(PacketIdentifier::parse(input)?)
            } else {
                None
            };

            let properties = PublishProperties::parse(input)?;

            // the rest of the body is the application payload, opaque bytes
            let payload = input.finish();

            Ok(MPublish {
                dup,
                qos,
                retain,
                topic_name,
                packet_identifier,
                properties,
                payload,
            })
        })
        .parse_next(input)
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if (self.qos == QualityOfService::AtMostOnce) != self.packet_identifier.is_none() {
            return Err(EncodeError::InvalidPacketIdentifier);
        }

        let size = crate::strings::string_binary_size(self.topic_name)? as u64
            + self
                .packet_identifier
                .map(|id| id.binary_size())
                .unwrap_or(0) as u64
            + self.properties.binary_size()? as u64
            + self.payload.len() as u64;

        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::strings::write_string(buffer, self.topic_name)?;
        if let Some(id) = &self.packet_identifier {
            id.write(buffer)?;
        }
        self.properties.write(buffer)?;
        buffer.write_slice(self.payload)
    }
}
