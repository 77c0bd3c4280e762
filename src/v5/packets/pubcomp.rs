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
    pub enum PubcompReasonCode {
        Success = crate::v5::reason_code::Success,
        PacketIdentifierNotFound = crate::v5::reason_code::PacketIdentifierNotFound,
    }
}

define_properties! {
    pub struct PubcompProperties<'i> {
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901151")]
pub struct MPubcomp<'i> {
    pub packet_identifier: PacketIdentifier,
    pub reason: PubcompReasonCode,
    pub properties: PubcompProperties<'i>,
}

impl<'i> MPubcomp<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MPubcomp<'i>> {
        let packet_identifier = PacketIdentifier::parse(input)?;

        let reason = if input.is_empty() {
            PubcompReasonCode::Success
        } else {
            PubcompReasonCode::parse(input)?
        };

        let properties = if input.is_empty() {
            PubcompProperties::new()
        } else {
            PubcompProperties::parse(input)?
        };

        eof(input)?;

        Ok(MPubcomp {
            packet_identifier,
            reason,
            properties,
        })
    }

    fn is_short_packet(&self) -> bool {
        self.reason == PubcompReasonCode::Success && self.properties == PubcompProperties::new()
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
