//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Handling of MQTT strings
//!
//! An MQTT string is a 16-bit big-endian length prefix followed by that many
//! bytes of UTF-8. U+0000 is banned everywhere, even though UTF-8 can
//! represent it.

use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::Bytes;
use winnow::Parser;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Parse an MQTT string
#[doc = crate::util::md_speclink!("_Toc3901010")]
pub fn parse_string<'i>(input: &mut &'i Bytes) -> MResult<&'i str> {
    trace("mqtt_string", |input: &mut &'i Bytes| {
        let data: &[u8] = winnow::binary::length_take(crate::integers::parse_u16)
            .parse_next(input)?;

        if data.contains(&0) {
            return Err(ErrMode::Cut(DecodeError::NullCharacter));
        }

        core::str::from_utf8(data).map_err(|_| ErrMode::Cut(DecodeError::InvalidUtf8))
    })
    .parse_next(input)
}

/// Parse a pair of MQTT strings, as used by user properties
pub fn string_pair<'i>(input: &mut &'i Bytes) -> MResult<(&'i str, &'i str)> {
    let first = parse_string(input)?;
    let second = parse_string(input)?;

    Ok((first, second))
}

pub fn string_binary_size(s: &str) -> Result<u32, EncodeError> {
    if s.len() > u16::MAX as usize {
        return Err(EncodeError::InvalidStringLength(s.len()));
    }
    if s.as_bytes().contains(&0) {
        return Err(EncodeError::NullCharacter);
    }
    Ok(2 + s.len() as u32)
}

pub fn write_string<W: WriteMqttPacket>(buffer: &mut W, s: &str) -> WResult<W> {
    let len =
        u16::try_from(s.len()).map_err(|_| EncodeError::InvalidStringLength(s.len()))?;

    buffer.write_u16(len)?;
    buffer.write_slice(s.as_bytes())
}
