//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::error::ErrMode;
use winnow::Bytes;

use crate::boolean::parse_bool;
use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::integers::fit_remaining_length;
use crate::v5::properties::define_properties;
use crate::v5::variable_header::AssignedClientIdentifier;
use crate::v5::variable_header::AuthenticationData;
use crate::v5::variable_header::AuthenticationMethod;
use crate::v5::variable_header::MaximumPacketSize;
use crate::v5::variable_header::MaximumQoS;
use crate::v5::variable_header::ReasonString;
use crate::v5::variable_header::ReceiveMaximum;
use crate::v5::variable_header::ResponseInformation;
use crate::v5::variable_header::RetainAvailable;
use crate::v5::variable_header::ServerKeepAlive;
use crate::v5::variable_header::ServerReference;
use crate::v5::variable_header::SessionExpiryInterval;
use crate::v5::variable_header::SharedSubscriptionAvailable;
use crate::v5::variable_header::SubscriptionIdentifiersAvailable;
use crate::v5::variable_header::TopicAliasMaximum;
use crate::v5::variable_header::UserProperties;
use crate::v5::variable_header::WildcardSubscriptionAvailable;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum ConnackReasonCode {
        Success = crate::v5::reason_code::Success,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        MalformedPacket = crate::v5::reason_code::MalformedPacket,
        ProtocolError = crate::v5::reason_code::ProtocolError,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        UnsupportedProtocolVersion = crate::v5::reason_code::UnsupportedProtocolVersion,
        ClientIdentifierNotValid = crate::v5::reason_code::ClientIdentifierNotValid,
        BadUsernameOrPassword = crate::v5::reason_code::BadUsernameOrPassword,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        ServerUnavailable = crate::v5::reason_code::ServerUnavailable,
        ServerBusy = crate::v5::reason_code::ServerBusy,
        Banned = crate::v5::reason_code::Banned,
        BadAuthenticationMethod = crate::v5::reason_code::BadAuthenticationMethod,
        TopicNameInvalid = crate::v5::reason_code::TopicNameInvalid,
        PacketTooLarge = crate::v5::reason_code::PacketTooLarge,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        PayloadFormatInvalid = crate::v5::reason_code::PayloadFormatInvalid,
        RetainNotSupported = crate::v5::reason_code::RetainNotSupported,
        QoSNotSupported = crate::v5::reason_code::QoSNotSupported,
        UseAnotherServer = crate::v5::reason_code::UseAnotherServer,
        ServerMoved = crate::v5::reason_code::ServerMoved,
        ConnectionRateExceeded = crate::v5::reason_code::ConnectionRateExceeded,
    }
}

define_properties! {
    pub struct ConnackProperties<'i> {
        session_expiry_interval: SessionExpiryInterval,
        receive_maximum: ReceiveMaximum,
        maximum_qos: MaximumQoS,
        retain_available: RetainAvailable,
        maximum_packet_size: MaximumPacketSize,
        assigned_client_identifier: AssignedClientIdentifier<'i>,
        topic_alias_maximum: TopicAliasMaximum,
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
        wildcard_subscription_available: WildcardSubscriptionAvailable,
        subscription_identifiers_available: SubscriptionIdentifiersAvailable,
        shared_subscription_available: SharedSubscriptionAvailable,
        server_keep_alive: ServerKeepAlive,
        response_information: ResponseInformation<'i>,
        server_reference: ServerReference<'i>,
        authentication_method: AuthenticationMethod<'i>,
        authentication_data: AuthenticationData<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901074")]
pub struct MConnack<'i> {
    pub session_present: bool,
    pub reason_code: ConnackReasonCode,
    pub properties: ConnackProperties<'i>,
}

impl<'i> MConnack<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MConnack<'i>> {
        // the acknowledge flags byte reserves bits 7-1
        let session_present = parse_bool(input)?;
        let reason_code = ConnackReasonCode::parse(input)?;

        if session_present && reason_code != ConnackReasonCode::Success {
            return Err(ErrMode::Cut(DecodeError::InvalidConnack));
        }

        let properties = ConnackProperties::parse(input)?;
        eof(input)?;

        Ok(MConnack {
            session_present,
            reason_code,
            properties,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        let size = 1u64
            + self.reason_code.binary_size() as u64
            + self.properties.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::boolean::write_bool(buffer, self.session_present)?;
        self.reason_code.write(buffer)?;
        self.properties.write(buffer)
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU16;

    use winnow::Bytes;

    use super::ConnackProperties;
    use super::ConnackReasonCode;
    use super::MConnack;
    use crate::error::DecodeError;
    use crate::qos::MaximumQualityOfService;
    use crate::v5::variable_header::AssignedClientIdentifier;
    use crate::v5::variable_header::MaximumQoS;
    use crate::v5::variable_header::ReasonString;
    use crate::v5::variable_header::ReceiveMaximum;
    use crate::v5::variable_header::RetainAvailable;
    use crate::v5::variable_header::ServerKeepAlive;
    use crate::v5::variable_header::SessionExpiryInterval;
    use crate::v5::variable_header::UserProperties;

    #[test]
    fn test_roundtrip_connack_no_props() {
        crate::test::make_roundtrip_test!(MConnack {
            session_present: true,
            reason_code: ConnackReasonCode::Success,
            properties: ConnackProperties::new(),
        });
    }

    #[test]
    fn test_roundtrip_connack_with_props() {
        crate::test::make_roundtrip_test!(MConnack {
            session_present: false,
            reason_code: ConnackReasonCode::ServerBusy,
            properties: ConnackProperties {
                session_expiry_interval: Some(SessionExpiryInterval(120)),
                receive_maximum: Some(ReceiveMaximum(NonZeroU16::new(123).unwrap())),
                maximum_qos: Some(MaximumQoS(MaximumQualityOfService::AtMostOnce)),
                retain_available: Some(RetainAvailable(true)),
                maximum_packet_size: None,
                assigned_client_identifier: Some(AssignedClientIdentifier("foobar")),
                topic_alias_maximum: None,
                reason_string: Some(ReasonString("reason")),
                user_properties: Some(UserProperties(&[0x0, 0x1, b'f', 0x0, 0x2, b'h', b'j'])),
                wildcard_subscription_available: None,
                subscription_identifiers_available: None,
                shared_subscription_available: None,
                server_keep_alive: Some(ServerKeepAlive(123)),
                response_information: None,
                server_reference: None,
                authentication_method: None,
                authentication_data: None,
            },
        });
    }

    #[test]
    fn test_session_present_consistency() {
        // session present together with a rejection
        let input = [
            0x01, // acknowledge flags, session present
            0x89, // server busy
            0x00, // no properties
        ];

        let err = MConnack::parse(&mut Bytes::new(&input)).unwrap_err();
        assert_eq!(DecodeError::from(err), DecodeError::InvalidConnack);
    }

    #[test]
    fn test_reserved_acknowledge_flags() {
        let input = [0x02, 0x00, 0x00];

        let err = MConnack::parse(&mut Bytes::new(&input)).unwrap_err();
        assert_eq!(DecodeError::from(err), DecodeError::InvalidBool(2));
    }
}
