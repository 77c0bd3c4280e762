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
use crate::v5::properties::define_properties;
use crate::v5::variable_header::ReasonString;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum SubackReasonCode {
        GrantedQoS0 = crate::v5::reason_code::GrantedQoS0,
        GrantedQoS1 = crate::v5::reason_code::GrantedQoS1,
        GrantedQoS2 = crate::v5::reason_code::GrantedQoS2,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        TopicFilterInvalid = crate::v5::reason_code::TopicFilterInvalid,
        PacketIdentifierInUse = crate::v5::reason_code::PacketIdentifierInUse,
        QuotaExceeded = crate::v5::reason_code::QuotaExceeded,
        SharedSubscriptionsNotSupported = crate::v5::reason_code::SharedSubscriptionsNotSupported,
        SubscriptionIdentifiersNotSupported = crate::v5::reason_code::SubscriptionIdentifiersNotSupported,
        WildcardSubscriptionsNotSupported = crate::v5::reason_code::WildcardSubscriptionsNotSupported,
    }
}

define_properties! {
    pub struct SubackProperties<'i> {
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
    }
}

/// The non-empty reason code list of a SUBACK, one code per requested
/// subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubackReasons<'i> {
    block: &'i [u8],
}

impl<'i> SubackReasons<'i> {
    pub fn new(block: &'i [u8]) -> SubackReasons<'i> {
        SubackReasons { block }
    }

    pub fn parse(input: &mut &'i Bytes) -> MResult<SubackReasons<'i>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            SubackReasonCode::parse(&mut check)?;
        }

        Ok(SubackReasons { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            SubackReasonCode::parse(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> SubackReasonsIter<'i> {
        SubackReasonsIter {
            current: Bytes::new(self.block),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubackReasonsIter<'i> {
    current: &'i Bytes,
}

impl Iterator for SubackReasonsIter<'_> {
    type Item = SubackReasonCode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let reason = SubackReasonCode::parse(&mut self.current)
            .expect("reason code block was validated when it was parsed");

        Some(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901171")]
pub struct MSuback<'i> {
    pub packet_identifier: PacketIdentifier,
    pub properties: SubackProperties<'i>,
    pub reasons: SubackReasons<'i>,
}

impl<'i> MSuback<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MSuback<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;
        let properties = SubackProperties::parse(input)?;
        let reasons = SubackReasons::parse(input)?;

        Ok(MSuback {
            packet_identifier,
            properties,
            reasons,
        })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        let size = self.packet_identifier.binary_size() as u64
            + self.properties.binary_size()? as u64
            + self.reasons.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)?;
        self.reasons.write(buffer)
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU16;

    use winnow::Bytes;

    use super::MSuback;
    use super::SubackProperties;
    use super::SubackReasonCode;
    use super::SubackReasons;
    use crate::identifier::PacketIdentifier;

    #[test]
    fn test_roundtrip_suback() {
        crate::test::make_roundtrip_test!(MSuback {
            packet_identifier: PacketIdentifier(NonZeroU16::new(89).unwrap()),
            properties: SubackProperties::new(),
            reasons: SubackReasons::new(&[0x00, 0x02, 0x80]),
        });
    }

    #[test]
    fn test_reason_iteration() {
        let reasons = SubackReasons::new(&[0x00, 0x9E]);
        let collected: Vec<_> = reasons.iter().collect();
        assert_eq!(
            collected,
            vec![
                SubackReasonCode::GrantedQoS0,
                SubackReasonCode::SharedSubscriptionsNotSupported,
            ]
        );
    }

    #[test]
    fn test_empty_reasons_rejected() {
        // packet identifier and empty properties, then nothing
        let input = [0x00, 0x59, 0x00];
        MSuback::parse(&mut Bytes::new(&input)).unwrap_err();
    }

    #[test]
    fn test_invalid_reason_rejected() {
        let input = [0x00, 0x59, 0x00, 0x03];
        MSuback::parse(&mut Bytes::new(&input)).unwrap_err();
    }
}
