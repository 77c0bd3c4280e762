//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::Bytes;
use winnow::Parser;

use crate::connect::validate_client_identifier;
use crate::connect::ConnectFlags;
use crate::error::EncodeError;
use crate::integers::fit_remaining_length;
use crate::level::parse_protocol_header;
use crate::level::write_protocol_header;
use crate::level::ProtocolLevel;
use crate::qos::QualityOfService;
use crate::topic::validate_topic_name;
use crate::v5::variable_header::AuthenticationData;
use crate::v5::variable_header::AuthenticationMethod;
use crate::v5::variable_header::ContentType;
use crate::v5::variable_header::CorrelationData;
use crate::v5::variable_header::MaximumPacketSize;
use crate::v5::variable_header::MessageExpiryInterval;
use crate::v5::variable_header::PayloadFormatIndicator;
use crate::v5::variable_header::ReceiveMaximum;
use crate::v5::variable_header::RequestProblemInformation;
use crate::v5::variable_header::RequestResponseInformation;
use crate::v5::variable_header::ResponseTopic;
use crate::v5::variable_header::SessionExpiryInterval;
use crate::v5::variable_header::TopicAliasMaximum;
use crate::v5::variable_header::UserProperties;
use crate::v5::variable_header::WillDelayInterval;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;
use crate::ParserSettings;

crate::v5::properties::define_properties! {
    pub struct ConnectProperties<'i> {
        session_expiry_interval: SessionExpiryInterval,
        receive_maximum: ReceiveMaximum,
        maximum_packet_size: MaximumPacketSize,
        topic_alias_maximum: TopicAliasMaximum,
        request_response_information: RequestResponseInformation,
        request_problem_information: RequestProblemInformation,
        user_properties: UserProperties<'i>,
        authentication_method: AuthenticationMethod<'i>,
        authentication_data: AuthenticationData<'i>,
    }
}

crate::v5::properties::define_properties! {
    pub struct ConnectWillProperties<'i> {
        will_delay_interval: WillDelayInterval,
        payload_format_indicator: PayloadFormatIndicator,
        message_expiry_interval: MessageExpiryInterval,
        content_type: ContentType<'i>,
        response_topic: ResponseTopic<'i>,
        correlation_data: CorrelationData<'i>,
        user_properties: UserProperties<'i>,
    }
}

/// The last will a v5 client deposits with its CONNECT
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Will<'i> {
    pub properties: ConnectWillProperties<'i>,
    pub topic: &'i str,
    pub payload: &'i [u8],
    pub will_qos: QualityOfService,
    pub will_retain: bool,
}

impl Will<'_> {
    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(self.properties.binary_size()?
            + crate::strings::string_binary_size(self.topic)?
            + crate::bytes::binary_data_binary_size(self.payload)?)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.properties.write(buffer)?;
        crate::strings::write_string(buffer, self.topic)?;
        crate::bytes::write_binary_data(buffer, self.payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901033")]
pub struct MConnect<'i> {
    pub client_identifier: &'i str,
    pub username: Option<&'i str>,
    pub password: Option<&'i [u8]>,
    pub clean_start: bool,
    pub will: Option<Will<'i>>,
    pub properties: ConnectProperties<'i>,
    pub keep_alive: u16,
}

impl<'i> MConnect<'i> {
    pub fn parse(settings: &ParserSettings, input: &mut &'i Bytes) -> MResult<MConnect<'i>> {
        trace("MConnect", |input: &mut &'i Bytes| {
            let level = parse_protocol_header(input)?;
            level.require(ProtocolLevel::V5).map_err(ErrMode::Cut)?;

            let flags = ConnectFlags::parse(input)?;
            let keep_alive = crate::integers::parse_u16(input)?;
            let properties = ConnectProperties::parse(input)?;

            // finished parsing the variable header, now the payload

            let client_identifier = crate::strings::parse_string(input)?;
            validate_client_identifier(client_identifier, settings).map_err(ErrMode::Cut)?;

            let will = if flags.will {
                let properties = ConnectWillProperties::parse(input)?;
                let topic = crate::strings::parse_string(input)?;
                validate_topic_name(topic).map_err(ErrMode::Cut)?;
                let payload = crate::bytes::parse_binary_data(input)?;

                Some(Will {
                    properties,
                    topic,
                    payload,
                    will_qos: flags.will_qos,
                    will_retain: flags.will_retain,
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
                client_identifier,
                username,
                password,
                clean_start: flags.clean_session,
                will,
                properties,
                keep_alive,
            })
        })
        .parse_next(input)
    }

    fn connect_flags(&self) -> Result<ConnectFlags, EncodeError> {
        if self.password.is_some() && self.username.is_none() {
            return Err(EncodeError::InvalidPayload(
                crate::error::DecodeError::InvalidConnectFlags,
            ));
        }

        Ok(ConnectFlags {
            username: self.username.is_some(),
            password: self.password.is_some(),
            will_retain: self.will.map(|w| w.will_retain).unwrap_or(false),
            will_qos: self
                .will
                .map(|w| w.will_qos)
                .unwrap_or(QualityOfService::AtMostOnce),
            will: self.will.is_some(),
            clean_session: self.clean_start,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        self.connect_flags()?;

        let mut size = 10u64; // protocol name and level, flags, keep alive
        size += self.properties.binary_size()? as u64;
        size += crate::strings::string_binary_size(self.client_identifier)? as u64;
        if let Some(will) = &self.will {
            size += will.binary_size()? as u64;
        }
        if let Some(username) = self.username {
            size += crate::strings::string_binary_size(username)? as u64;
        }
        if let Some(password) = self.password {
            size += crate::bytes::binary_data_binary_size(password)? as u64;
        }

        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_protocol_header(buffer, ProtocolLevel::V5)?;
        buffer.write_byte(self.connect_flags()?.to_byte())?;
        buffer.write_u16(self.keep_alive)?;
        self.properties.write(buffer)?;

        crate::strings::write_string(buffer, self.client_identifier)?;
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
