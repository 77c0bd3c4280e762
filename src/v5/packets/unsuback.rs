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
    pub enum UnsubackReasonCode {
        Success = crate::v5::reason_code::Success,
        NoSubscriptionExisted = crate::v5::reason_code::NoSubscriptionExisted,
        UnspecifiedError = crate::v5::reason_code::UnspecifiedError,
        ImplementationSpecificError = crate::v5::reason_code::ImplementationSpecificError,
        NotAuthorized = crate::v5::reason_code::NotAuthorized,
        TopicFilterInvalid = crate::v5::reason_code::TopicFilterInvalid,
        PacketIdentifierInUse = crate::v5::reason_code::PacketIdentifierInUse,
    }
}

define_properties! {
    pub struct UnsubackProperties<'i> {
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
    }
}

/// The non-empty reason code list of an UNSUBACK, one code per requested
/// filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsubackReasons<'i> {
    block: &'i [u8],
}

impl<'i> UnsubackReasons<'i> {
    pub fn new(block: &'i [u8]) -> UnsubackReasons<'i> {
        UnsubackReasons { block }
    }

    pub fn parse(input: &mut &'i Bytes) -> MResult<UnsubackReasons<'i>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            UnsubackReasonCode::parse(&mut check)?;
        }

        Ok(UnsubackReasons { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            UnsubackReasonCode::parse(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> UnsubackReasonsIter<'i> {
        UnsubackReasonsIter {
            current: Bytes::new(self.block),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnsubackReasonsIter<'i> {
    current: &'i Bytes,
}

impl Iterator for UnsubackReasonsIter<'_> {
    type Item = UnsubackReasonCode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let reason = UnsubackReasonCode::parse(&mut self.current)
            .expect("reason code block was validated when it was parsed");

        Some(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901187")]
pub struct MUnsuback<'i> {
    pub packet_identifier: PacketIdentifier,
    pub properties: UnsubackProperties<'i>,
    pub reasons: UnsubackReasons<'i>,
}

impl<'i> MUnsuback<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MUnsuback<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;
        let properties = UnsubackProperties::parse(input)?;
        let reasons = UnsubackReasons::parse(input)?;

        Ok(MUnsuback {
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

    use super::MUnsuback;
    use super::UnsubackProperties;
    use super::UnsubackReasons;
    use crate::identifier::PacketIdentifier;

    #[test]
    fn test_roundtrip_unsuback() {
        crate::test::make_roundtrip_test!(MUnsuback {
            packet_identifier: PacketIdentifier(NonZeroU16::new(89).unwrap()),
            properties: UnsubackProperties::new(),
            reasons: UnsubackReasons::new(&[0x00, 0x11]),
        });
    }

    #[test]
    fn test_empty_reasons_rejected() {
        let input = [0x00, 0x59, 0x00];
        MUnsuback::parse(&mut Bytes::new(&input)).unwrap_err();
    }
}
