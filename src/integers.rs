//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Various ways to parse MQTT integers
//!
//! All integers in MQTT are big-endian

use winnow::combinator::trace;
use winnow::error::ErrMode;
use winnow::stream::Stream;
use winnow::stream::StreamIsPartial;
use winnow::Bytes;
use winnow::Parser;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Parse a u16
#[doc = crate::util::md_speclink!("_Toc3901008")]
pub fn parse_u16(input: &mut &Bytes) -> MResult<u16> {
    trace(
        "mqtt_u16",
        winnow::binary::u16(winnow::binary::Endianness::Big),
    )
    .parse_next(input)
}

/// Parse a u32
#[doc = crate::util::md_speclink!("_Toc3901009")]
pub fn parse_u32(input: &mut &Bytes) -> MResult<u32> {
    trace(
        "mqtt_u32",
        winnow::binary::u32(winnow::binary::Endianness::Big),
    )
    .parse_next(input)
}

/// The largest value a variable byte integer can hold
pub const VARIABLE_INTEGER_MAX: u32 = 268_435_455;

/// Parse a variable byte integer
///
/// At most four bytes are examined. Only canonical encodings are accepted:
/// the shortest byte sequence that can represent the value. A chain whose
/// final byte has an all-zero payload (other than the single byte `0x00`)
/// would have a shorter equivalent and is rejected, as is a chain that does
/// not terminate within four bytes.
///
/// On a [`winnow::Partial`] stream a truncated chain reports
/// [`ErrMode::Incomplete`]; on a complete stream it is a length mismatch.
#[doc = crate::util::md_speclink!("_Toc3901011")]
pub fn parse_variable_u32<I>(input: &mut I) -> MResult<u32>
where
    I: Stream<Token = u8> + StreamIsPartial,
{
    trace("mqtt_variable_u32", |input: &mut I| {
        let mut value: u32 = 0;

        for exp in 0u32..4 {
            let byte = winnow::binary::u8(input)?;
            value += ((byte & 0b0111_1111) as u32) << (7 * exp);

            if byte & 0b1000_0000 == 0 {
                if byte == 0 && exp > 0 {
                    return Err(ErrMode::Cut(DecodeError::InvalidVariableInteger));
                }
                return Ok(value);
            }
        }

        Err(ErrMode::Cut(DecodeError::InvalidVariableInteger))
    })
    .parse_next(input)
}

/// How many bytes the variable byte encoding of `u` occupies
#[inline]
pub const fn variable_u32_binary_size(u: u32) -> u32 {
    match u {
        0..=127 => 1,
        128..=16383 => 2,
        16384..=2_097_151 => 3,
        2_097_152..=268_435_455 => 4,
        _size => unreachable!(),
    }
}

/// Check that a computed body size fits a remaining-length field
pub(crate) fn fit_remaining_length(size: u64) -> Result<u32, EncodeError> {
    if size > VARIABLE_INTEGER_MAX as u64 {
        return Err(EncodeError::PacketTooLarge);
    }
    Ok(size as u32)
}

pub fn write_variable_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    match u {
        0..=127 => {
            buffer.write_byte(u as u8)?;
        }
        len @ 128..=16383 => {
            let first = (len % 128) | 0b1000_0000;
            let second = len / 128;
            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
        }
        len @ 16384..=2_097_151 => {
            let first = (len % 128) | 0b1000_0000;
            let second = ((len / 128) % 128) | 0b1000_0000;
            let third = len / (128 * 128);

            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
            buffer.write_byte(third as u8)?;
        }
        len @ 2_097_152..=268_435_455 => {
            let first = (len % 128) | 0b1000_0000;
            let second = ((len / 128) % 128) | 0b1000_0000;
            let third = ((len / (128 * 128)) % 128) | 0b1000_0000;
            let fourth = len / (128 * 128 * 128);

            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
            buffer.write_byte(third as u8)?;
            buffer.write_byte(fourth as u8)?;
        }
        _size => {
            return Err(EncodeError::PacketTooLarge.into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroUsize;

    use pretty_assertions::assert_eq;
    use winnow::error::ErrMode;
    use winnow::Bytes;
    use winnow::Partial;

    use crate::error::DecodeError;
    use crate::integers::parse_u16;
    use crate::integers::parse_u32;
    use crate::integers::parse_variable_u32;
    use crate::integers::variable_u32_binary_size;
    use crate::integers::write_variable_u32;
    use crate::test::TestWriter;

    #[test]
    fn check_integer_parsing() {
        let input = 15u16.to_be_bytes();
        assert_eq!(parse_u16(&mut Bytes::new(&input)).unwrap(), 15);

        let input = 42u32.to_be_bytes();
        assert_eq!(parse_u32(&mut Bytes::new(&input)).unwrap(), 42);
    }

    #[test]
    fn check_variable_integers() {
        let cases: &[(&[u8], u32)] = &[
            (&[0x0], 0),
            (&[0x7F], 127),
            (&[0x80, 0x01], 128),
            (&[0xC1, 0x02], 321),
            (&[0xFF, 0x7F], 16_383),
            (&[0x80, 0x80, 0x01], 16_384),
            (&[0xFF, 0xFF, 0x7F], 2_097_151),
            (&[0x80, 0x80, 0x80, 0x01], 2_097_152),
            (&[0xFF, 0xFF, 0xFF, 0x7F], 268_435_455),
        ];

        for (input, expected) in cases {
            assert_eq!(
                parse_variable_u32(&mut Bytes::new(input)).unwrap(),
                *expected
            );
            assert_eq!(variable_u32_binary_size(*expected), input.len() as u32);
        }
    }

    #[test]
    fn check_non_canonical_variable_integers() {
        // 0x80 0x00 encodes 0, which must be the single byte 0x00
        let input = [0x80, 0x00];
        assert_eq!(
            parse_variable_u32(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidVariableInteger)
        );

        let input = [0x81, 0x00];
        assert_eq!(
            parse_variable_u32(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidVariableInteger)
        );

        // no terminating byte within four bytes
        let input = [0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            parse_variable_u32(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidVariableInteger)
        );
    }

    #[test]
    fn check_incomplete_parsing() {
        let input = [0xFF];
        assert_eq!(
            parse_variable_u32(&mut Partial::new(Bytes::new(&input))).unwrap_err(),
            ErrMode::Incomplete(winnow::error::Needed::Size(NonZeroUsize::new(1).unwrap()))
        );

        let input = [0xFF, 0xFF, 0xFF];
        assert_eq!(
            parse_variable_u32(&mut Partial::new(Bytes::new(&input))).unwrap_err(),
            ErrMode::Incomplete(winnow::error::Needed::Size(NonZeroUsize::new(1).unwrap()))
        );

        // a complete but truncated chain is a length mismatch
        let input = [0xFF, 0xFF, 0xFF];
        assert_eq!(
            parse_variable_u32(&mut Bytes::new(&input)).unwrap_err(),
            ErrMode::Backtrack(DecodeError::PacketLengthMismatch)
        );
    }

    #[test]
    fn check_variable_integer_roundtrip() {
        // step by some prime number
        for i in (0..268_435_455u32).step_by(2_097_169) {
            let mut writer = TestWriter { buffer: Vec::new() };

            write_variable_u32(&mut writer, i).unwrap();
            assert_eq!(writer.buffer.len() as u32, variable_u32_binary_size(i));

            let out = parse_variable_u32(&mut Bytes::new(&writer.buffer)).unwrap();
            assert_eq!(out, i);
        }
    }
}
