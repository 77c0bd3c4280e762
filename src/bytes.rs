//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Ways to parse MQTT byte data

use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::Bytes;
use winnow::Parser;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Parse length-prefixed binary data
#[doc = crate::util::md_speclink!("_Toc3901012")]
pub fn parse_binary_data<'i>(input: &mut &'i Bytes) -> MResult<&'i [u8]> {
    trace("mqtt_binary_data", |input: &mut &'i Bytes| {
        winnow::binary::length_take(crate::integers::parse_u16).parse_next(input)
    })
    .parse_next(input)
}

/// Parse length-prefixed binary data that must be exactly `expected` bytes
pub fn parse_binary_data_length<'i>(
    input: &mut &'i Bytes,
    expected: usize,
) -> MResult<&'i [u8]> {
    let data = parse_binary_data(input)?;
    if data.len() != expected {
        return Err(ErrMode::Cut(DecodeError::UnexpectedLength {
            expected,
            actual: data.len(),
        }));
    }
    Ok(data)
}

/// Assert that a packet body has exactly `expected` bytes left
pub fn require_length(input: &Bytes, expected: usize) -> Result<(), DecodeError> {
    if input.len() != expected {
        return Err(DecodeError::UnexpectedLength {
            expected,
            actual: input.len(),
        });
    }
    Ok(())
}

pub fn binary_data_binary_size(data: &[u8]) -> Result<u32, EncodeError> {
    if data.len() > u16::MAX as usize {
        return Err(EncodeError::InvalidStringLength(data.len()));
    }
    Ok(2 + data.len() as u32)
}

pub fn write_binary_data<W: WriteMqttPacket>(buffer: &mut W, slice: &[u8]) -> WResult<W> {
    let slice_len = u16::try_from(slice.len())
        .map_err(|_| EncodeError::InvalidStringLength(slice.len()))?;

    buffer.write_u16(slice_len)?;
    buffer.write_slice(slice)
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use crate::bytes::parse_binary_data;
    use crate::bytes::parse_binary_data_length;
    use crate::bytes::require_length;
    use crate::bytes::write_binary_data;
    use crate::error::DecodeError;
    use crate::test::TestWriter;

    #[test]
    fn check_binary_data() {
        let input = &[0x0, 0x2, 0x4, 0x2];

        assert_eq!(
            parse_binary_data(&mut Bytes::new(input)).unwrap(),
            &[0x4, 0x2]
        );
    }

    #[test]
    fn check_binary_data_length() {
        let input = &[0x0, 0x2, 0x4, 0x2];

        parse_binary_data_length(&mut Bytes::new(input), 2).unwrap();

        let err = parse_binary_data_length(&mut Bytes::new(input), 3).unwrap_err();
        assert_eq!(
            DecodeError::from(err),
            DecodeError::UnexpectedLength {
                expected: 3,
                actual: 2
            }
        );

        require_length(Bytes::new(input), 4).unwrap();
        require_length(Bytes::new(input), 5).unwrap_err();
    }

    #[test]
    fn check_binary_data_roundtrip() {
        let mut writer = TestWriter { buffer: Vec::new() };
        let data = &[0xFF, 0xAB, 0x42, 0x13, 0x37, 0x69];

        write_binary_data(&mut writer, data).unwrap();
        let out = parse_binary_data(&mut Bytes::new(&writer.buffer)).unwrap();

        assert_eq!(out, data);
    }
}
