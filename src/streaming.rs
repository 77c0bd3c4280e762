//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Carving individual packets out of a growing receive buffer
//!
//! A transport reads into a buffer and has no idea where packet boundaries
//! lie. [`StreamingDecoder`] finds them: it alternates between awaiting a
//! header and awaiting the body that header announces, and only commits its
//! cursor once a whole packet is available. Everything it hands out borrows
//! from the caller's buffer.

use winnow::Bytes;
use winnow::Partial;

use crate::error::DecodeError;
use crate::fixed_header::FixedHeader;

/// A cursor over a byte buffer that yields one packet at a time
///
/// [`DecodeError::IncompleteBuffer`] from either method is not a protocol
/// error. It means: feed more bytes, rebuild the decoder over the grown
/// buffer, and skip the first [`StreamingDecoder::consumed`] bytes by
/// constructing it from the unread tail.
#[derive(Debug)]
pub struct StreamingDecoder<'i> {
    buffer: &'i [u8],
    offset: usize,
}

impl<'i> StreamingDecoder<'i> {
    pub fn new(buffer: &'i [u8]) -> StreamingDecoder<'i> {
        StreamingDecoder { buffer, offset: 0 }
    }

    /// Parse the fixed header of the next packet without committing to it
    ///
    /// The cursor only advances once [`StreamingDecoder::next_packet`] finds
    /// the whole body, so calling this repeatedly is fine.
    pub fn next_header(&self) -> Result<FixedHeader, DecodeError> {
        let mut input = Partial::new(Bytes::new(&self.buffer[self.offset..]));
        FixedHeader::parse(&mut input).map_err(DecodeError::from)
    }

    /// Carve off the body belonging to `header` and advance the cursor
    ///
    /// On 16-bit targets a packet can legitimately exceed the address space;
    /// that surfaces as [`DecodeError::PacketTooLarge`].
    pub fn next_packet(&mut self, header: &FixedHeader) -> Result<&'i Bytes, DecodeError> {
        let header_len = header.binary_size();
        let total = usize::try_from(header_len + header.remaining_length())
            .map_err(|_| DecodeError::PacketTooLarge)?;

        let available = self.buffer.len() - self.offset;
        if available < total {
            return Err(DecodeError::IncompleteBuffer);
        }

        let body_start = self.offset + header_len as usize;
        let body = &self.buffer[body_start..self.offset + total];
        self.offset += total;

        Ok(Bytes::new(body))
    }

    /// How many bytes of the buffer have been fully consumed
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// The part of the buffer no packet has been carved from yet
    pub fn unparsed(&self) -> &'i [u8] {
        &self.buffer[self.offset..]
    }
}
