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
    pub enum PubrecReasonCode {
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
    pub struct PubrecProperties<'i> {
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901131")]
pub struct MPubrec<'i> {
    pub packet_identifier: PacketIdentifier,
    pub reason: PubrecReasonCode,
    pub properties: PubrecProperties<'i>,
}

impl<'i> MPubrec<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MPubrec<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;

        let reason = if input.is_empty() {
            PubrecReasonCode::Success
        } else {
            PubrecReasonCode::parse(input)?
        };

        let properties = if input.is_empty() {
            PubrecProperties::new()
        } else {
            PubrecProperties::parse(input)?
        };

        eof(input)?;

        Ok(MPubrec {
            packet_identifier,
            reason,
            properties,
        })
    }

    fn is_short_packet(&self) -> bool {
        self.reason == PubrecReasonCode::Success && self.properties == PubrecProperties::new()
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

    use super::MPubrec;
    use super::PubrecProperties;
    use super::PubrecReasonCode;
    use crate::identifier::PacketIdentifier;
    use crate::v5::variable_header::ReasonString;

    #[test]
    fn test_roundtrip_pubrec_short() {
        crate::test::make_roundtrip_test!(MPubrec {
            packet_identifier: PacketIdentifier(NonZeroU16::new(13).unwrap()),
            reason: PubrecReasonCode::Success,
            properties: PubrecProperties::new(),
        });
    }

    #[test]
    fn test_roundtrip_pubrec_props() {
        crate::test::make_roundtrip_test!(MPubrec {
            packet_identifier: PacketIdentifier(NonZeroU16::new(13).unwrap()),
            reason: PubrecReasonCode::NotAuthorized,
            properties: PubrecProperties {
                reason_string: Some(ReasonString("denied")),
                user_properties: None,
            },
        });
    }
}
