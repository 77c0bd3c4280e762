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
use crate::v5::variable_header::AuthenticationData;
use crate::v5::variable_header::AuthenticationMethod;
use crate::v5::variable_header::ReasonString;
use crate::v5::variable_header::UserProperties;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

crate::v5::reason_code::make_combined_reason_code! {
    pub enum AuthReasonCode {
        Success = crate::v5::reason_code::Success,
        ContinueAuthentication = crate::v5::reason_code::ContinueAuthentication,
        ReAuthenticate = crate::v5::reason_code::ReAuthenticate,
    }
}

define_properties! {
    pub struct AuthProperties<'i> {
        authentication_method: AuthenticationMethod<'i>,
        authentication_data: AuthenticationData<'i>,
        reason_string: ReasonString<'i>,
        user_properties: UserProperties<'i>,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901217")]
pub struct MAuth<'i> {
    pub reason: AuthReasonCode,
    pub properties: AuthProperties<'i>,
}

impl<'i> MAuth<'i> {
    pub fn parse(input: &mut &'i Bytes) -> MResult<MAuth<'i>> {
        // an empty body means success without properties
        let reason = if input.is_empty() {
            AuthReasonCode::Success
        } else {
            AuthReasonCode::parse(input)?
        };

        let properties = if input.is_empty() {
            AuthProperties::new()
        } else {
            AuthProperties::parse(input)?
        };

        eof(input)?;

        Ok(MAuth { reason, properties })
    }

    fn is_short_packet(&self) -> bool {
        self.reason == AuthReasonCode::Success && self.properties == AuthProperties::new()
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.is_short_packet() {
            return Ok(0);
        }

        let size = self.reason.binary_size() as u64 + self.properties.binary_size()? as u64;
        fit_remaining_length(size)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.is_short_packet() {
            return Ok(());
        }

        self.reason.write(buffer)?;
        self.properties.write(buffer)
    }
}
