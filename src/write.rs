//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The write side of the codec
//!
//! Encoding is two passes: a validation pass computes a [`PacketSize`], then
//! a write pass emits exactly that many bytes into a [`WriteMqttPacket`].
//! The codec itself never allocates; [`SliceWriter`] writes into a buffer
//! the caller sized from the validation pass.

use crate::error::EncodeError;
use crate::integers::variable_u32_binary_size;

pub type WResult<W> = core::result::Result<(), <W as WriteMqttPacket>::Error>;

pub trait WriteMqttPacket {
    type Error: From<EncodeError>;

    fn write_byte(&mut self, u: u8) -> WResult<Self>;

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self>;

    #[inline]
    fn write_u16(&mut self, u: u16) -> WResult<Self> {
        self.write_byte((u >> 8) as u8)?;
        self.write_byte(u as u8)
    }

    #[inline]
    fn write_u32(&mut self, u: u32) -> WResult<Self> {
        self.write_byte((u >> 24) as u8)?;
        self.write_byte((u >> 16) as u8)?;
        self.write_byte((u >> 8) as u8)?;
        self.write_byte(u as u8)
    }
}

/// The size of a packet as computed by the validation pass
///
/// The remaining length is bounded by the wire format, so the total always
/// fits a `u32`. Whether it fits the address space is a different question
/// on 16-bit targets, which is why [`PacketSize::buffer_len`] is checked; on
/// 32- and 64-bit targets that check compiles away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketSize {
    remaining_length: u32,
}

impl PacketSize {
    pub(crate) fn new(remaining_length: u32) -> PacketSize {
        PacketSize { remaining_length }
    }

    /// The value of the remaining-length field
    pub fn remaining_length(&self) -> u32 {
        self.remaining_length
    }

    /// The full on-wire size: fixed header, length prefix and body
    pub fn total(&self) -> u32 {
        1 + variable_u32_binary_size(self.remaining_length) + self.remaining_length
    }

    /// The output buffer size this packet needs
    pub fn buffer_len(&self) -> Result<usize, EncodeError> {
        usize::try_from(self.total()).map_err(|_| EncodeError::PacketTooLarge)
    }
}

/// A [`WriteMqttPacket`] over a caller-provided byte slice
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> SliceWriter<'a> {
        SliceWriter { buffer, offset: 0 }
    }

    /// How many bytes have been written so far
    pub fn written(&self) -> usize {
        self.offset
    }
}

impl WriteMqttPacket for SliceWriter<'_> {
    type Error = EncodeError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        match self.buffer.get_mut(self.offset) {
            Some(slot) => {
                *slot = u;
                self.offset += 1;
                Ok(())
            }
            None => Err(EncodeError::BufferTooSmall),
        }
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        let end = self
            .offset
            .checked_add(u.len())
            .ok_or(EncodeError::BufferTooSmall)?;

        let Some(target) = self.buffer.get_mut(self.offset..end) else {
            return Err(EncodeError::BufferTooSmall);
        };

        target.copy_from_slice(u);
        self.offset = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::SliceWriter;
    use super::WriteMqttPacket;
    use crate::error::EncodeError;

    #[test]
    fn check_slice_writer() {
        let mut buffer = [0u8; 4];
        let mut writer = SliceWriter::new(&mut buffer);

        writer.write_byte(0x01).unwrap();
        writer.write_u16(0x0203).unwrap();
        assert_eq!(writer.written(), 3);

        writer.write_slice(&[0x04]).unwrap();
        assert_eq!(
            writer.write_byte(0x05).unwrap_err(),
            EncodeError::BufferTooSmall
        );

        assert_eq!(buffer, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn check_multi_byte_writes() {
        let mut buffer = [0u8; 6];
        let mut writer = SliceWriter::new(&mut buffer);

        writer.write_u32(0xDEADBEEF).unwrap();
        writer.write_u16(0xCAFE).unwrap();

        assert_eq!(buffer, [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]);
    }
}
