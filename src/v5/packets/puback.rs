//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::Bytes;

use crate::error::EncodeError;
use crate::identifier::PacketIdentifier;
use crate::integers::fit_remaining_length;
use crate::v5::properties::define_properties;
use crate::v5::variable_header::ReasonString;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum PubackReasonCode {
        Success = crate::v5::reason_code::Success,
        NoMatchingSubscribers = crate::v5::reason_code::NoMatchingSubscribers,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        TopicNameInvalid = crate::v5::reason_code::TopicNameInvalid,
        PacketIdentifierInUse = crate::v5::reason_code::PacketIdentifierInUse,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        PayloadFormatInvalid = crate::v5::reason_code::PayloadFormatInvalid,
    }
}

define_properties! {
    pub struct PubackProperties<'i> {
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901121")]
pub struct MPuback<'i> {
    pub packet_identifier: PacketIdentifier,
    pub reason: PubackReasonCode,
    pub properties: PubackProperties<'i>,
}

impl<'i> MPuback<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MPuback<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;

        // a body of two bytes means success with no properties
        let reason = if input.is_empty() {
            PubackReasonCode::Success
        } else {
            PubackReasonCode::parse(input)?
        };

        let properties = if input.is_empty() {
            PubackProperties::new()
        } else {
            PubackProperties::parse(input)?
        };

        eof(input)?;

        Ok(MPuback {
            packet_identifier,
            reason,
            properties,
        })
    }

    fn is_short_packet(&self) -> bool {
        self.reason == PubackReasonCode::Success && self.properties == PubackProperties::new()
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.is_short_packet() {
            return Ok(self.packet_identifier.binary_size());
        }

        let size = self.packet_identifier.binary_size() as u64
            + self.reason.binary_size() as u64
            + self.properties.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;

        if self.is_short_packet() {
            return Ok(());
        }

        self.reason.write(buffer)?;
        self.properties.write(buffer)
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU16;

    use winnow::Bytes;

    use super::MPuback;
    use super::PubackProperties;
    use super::PubackReasonCode;
    use crate::identifier::PacketIdentifier;
    use crate::v5::variable_header::ReasonString;
    use crate::v5::variable_header::UserProperties;

    #[test]
    fn test_roundtrip_puback_short() {
        crate::test::make_roundtrip_test!(MPuback {
            packet_identifier: PacketIdentifier(NonZeroU16::new(13).unwrap()),
            reason: PubackReasonCode::Success,
            properties: PubackProperties::new(),
        });
    }

    #[test]
    fn test_roundtrip_puback_props() {
        crate::test::make_roundtrip_test!(MPuback {
            packet_identifier: PacketIdentifier(NonZeroU16::new(13).unwrap()),
            reason: PubackReasonCode::QuotaExceeded,
            properties: PubackProperties {
                reason_string: Some(ReasonString("fooobasrbbarbabwer")),
                user_properties: Some(UserProperties(&[0x0, 0x1, b'f', 0x0, 0x2, b'h', b'j'])),
            },
        });
    }

    #[test]
    fn test_short_form_decodes() {
        let input = [0x00, 0x0D];
        let puback = MPuback::parse(&mut Bytes::new(&input)).unwrap();

        assert_eq!(puback.reason, PubackReasonCode::Success);
        assert_eq!(puback.properties, PubackProperties::new());
    }

    #[test]
    fn test_reason_without_properties_decodes() {
        let input = [0x00, 0x0D, 0x10];
        let puback = MPuback::parse(&mut Bytes::new(&input)).unwrap();

        assert_eq!(puback.reason, PubackReasonCode::NoMatchingSubscribers);
        assert_eq!(puback.properties, PubackProperties::new());
    }
}
