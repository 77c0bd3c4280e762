//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::Bytes;

use crate::error::EncodeError;
use crate::integers::fit_remaining_length;
use crate::v5::properties::define_properties;
use crate::v5::variable_header::ReasonString;
use crate::v5::variable_header::ServerReference;
use crate::v5::variable_header::SessionExpiryInterval;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum DisconnectReasonCode {
        NormalDisconnection = crate::v5::reason_code::NormalDisconnection,
        DisconnectWithWillMessage = crate::v5::reason_code::DisconnectWithWillMessage,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        MalformedPacket = crate::v5::reason_code::MalformedPacket,
        ProtocolError = crate::v5::reason_code::ProtocolError,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        ServerBusy = crate::v5::reason_code::ServerBusy,
        ServerShuttingDown = crate::v5::reason_code::ServerShuttingDown,
        KeepAliveTimeout = crate::v5::reason_code::KeepAliveTimeout,
        SessionTakenOver = crate::v5::reason_code::SessionTakenOver,
        TopicFilterInvalid = crate::v5::reason_code::TopicFilterInvalid,
        TopicNameInvalid = crate::v5::reason_code::TopicNameInvalid,
        ReceiveMaximumExceeded = crate::v5::reason_code::ReceiveMaximumExceeded,
        TopicAliasInvalid = crate::v5::reason_code::TopicAliasInvalid,
        PacketTooLarge = crate::v5::reason_code::PacketTooLarge,
        MessageRateTooHigh = crate::v5::reason_code::MessageRateTooHigh,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        AdministrativeAction = crate::v5::reason_code::AdministrativeAction,
        PayloadFormatInvalid = crate::v5::reason_code::PayloadFormatInvalid,
        RetainNotSupported = crate::v5::reason_code::RetainNotSupported,
        QoSNotSupported = crate::v5::reason_code::QoSNotSupported,
        UseAnotherServer = crate::v5::reason_code::UseAnotherServer,
        ServerMoved = crate::v5::reason_code::ServerMoved,
        SharedSubscriptionsNotSupported = crate::v5::reason_code::SharedSubscriptionsNotSupported,
        ConnectionRateExceeded = crate::v5::reason_code::ConnectionRateExceeded,
        MaximumConnectTime = crate::v5::reason_code::MaximumConnectTime,
        SubscriptionIdentifiersNotSupported = crate::v5::reason_code::SubscriptionIdentifiersNotSupported,
        WildcardSubscriptionsNotSupported = crate::v5::reason_code::WildcardSubscriptionsNotSupported,
    }
}

define_properties! {
    pub struct DisconnectProperties<'i> {
        session_expiry_interval: SessionExpiryInterval,
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
        server_reference: ServerReference<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901205")]
pub struct MDisconnect<'i> {
    pub reason_code: DisconnectReasonCode,
    pub properties: DisconnectProperties<'i>,
}

impl<'i> MDisconnect<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MDisconnect<'i>> {
        // an empty body means a normal disconnect without properties
        let reason_code = if input.is_empty() {
            DisconnectReasonCode::NormalDisconnection
        } else {
            DisconnectReasonCode::parse(input)?
        };

        let properties = if input.is_empty() {
            DisconnectProperties::new()
        } else {
            DisconnectProperties::parse(input)?
        };

        eof(input)?;

        Ok(MDisconnect {
            reason_code,
            properties,
        })
    }

    fn is_short_packet(&self) -> bool {
        self.reason_code == DisconnectReasonCode::NormalDisconnection
            && self.properties == DisconnectProperties::new()
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.is_short_packet() {
            return Ok(0);
        }

        let size =
            self.reason_code.binary_size() as u64 + self.properties.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.is_short_packet() {
            return Ok(());
        }

        self.reason_code.write(buffer)?;
        self.properties.write(buffer)
    }
}
