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
use crate::qos::parse_qos;
use crate::qos::QualityOfService;
use crate::topic::validate_topic_filter;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// One (topic filter, requested QoS) pair of a SUBSCRIBE payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MSubscriptionRequest<'message> {
    pub topic_filter: &'message str,
    pub qos: QualityOfService,
}

impl<'message> MSubscriptionRequest<'message> {
    pub fn parse(input: &mut &'message Bytes) -> MResult<MSubscriptionRequest<'message>> {
        let topic_filter = crate::strings::parse_string(input)?;
        validate_topic_filter(topic_filter).map_err(ErrMode::Cut)?;

        // bits above the two QoS bits must be zero, which parse_qos covers
        let qos = parse_qos(input)?;

        Ok(MSubscriptionRequest { topic_filter, qos })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(crate::strings::string_binary_size(self.topic_filter)? + 1)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::strings::write_string(buffer, self.topic_filter)?;
        crate::qos::write_qos(buffer, self.qos)
    }
}

/// The non-empty subscription list of a SUBSCRIBE packet
///
/// Stored as the raw payload block and iterated lazily, so decoding stays
/// allocation-free. The block is fully validated up front; to build one for
/// encoding, write each request with [`MSubscriptionRequest::write`] into a
/// buffer and wrap it with [`MSubscriptionRequests::new`] (the sizing pass
/// re-validates it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MSubscriptionRequests<'message> {
    block: &'message [u8],
}

impl<'message> MSubscriptionRequests<'message> {
    pub fn new(block: &'message [u8]) -> MSubscriptionRequests<'message> {
        MSubscriptionRequests { block }
    }

    pub fn as_bytes(&self) -> &'message [u8] {
        self.block
    }

    pub fn parse(input: &mut &'message Bytes) -> MResult<MSubscriptionRequests<'message>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            MSubscriptionRequest::parse(&mut check)?;
        }

        Ok(MSubscriptionRequests { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            MSubscriptionRequest::parse(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> MSubscriptionRequestIter<'message> {
        MSubscriptionRequestIter {
            current: Bytes::new(self.block),
        }
    }
}

impl<'message> IntoIterator for MSubscriptionRequests<'message> {
    type Item = MSubscriptionRequest<'message>;
    type IntoIter = MSubscriptionRequestIter<'message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MSubscriptionRequestIter<'message> {
    current: &'message Bytes,
}

impl<'message> Iterator for MSubscriptionRequestIter<'message> {
    type Item = MSubscriptionRequest<'message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let request = MSubscriptionRequest::parse(&mut self.current)
            .expect("subscription block was validated when it was parsed");

        Some(request)
    }
}
