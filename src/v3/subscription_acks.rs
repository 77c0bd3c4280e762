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
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// One result code of a SUBACK payload
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MSubscriptionAck {
    MaximumQualityAtMostOnce = 0x00,
    MaximumQualityAtLeastOnce = 0x01,
    MaximumQualityExactlyOnce = 0x02,
    Failure = 0x80,
}

impl MSubscriptionAck {
    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        let byte = winnow::binary::u8(input)?;
        Self::try_from(byte).map_err(|_| ErrMode::Cut(DecodeError::InvalidSubackCode(byte)))
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(*self as u8)
    }
}

/// The non-empty result code list of a SUBACK, one code per requested
/// subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MSubscriptionAcks<'message> {
    block: &'message [u8],
}

impl<'message> MSubscriptionAcks<'message> {
    pub fn new(block: &'message [u8]) -> MSubscriptionAcks<'message> {
        MSubscriptionAcks { block }
    }

    pub fn parse(input: &mut &'message Bytes) -> MResult<MSubscriptionAcks<'message>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            MSubscriptionAck::parse(&mut check)?;
        }

        Ok(MSubscriptionAcks { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            MSubscriptionAck::parse(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> MSubscriptionAckIter<'message> {
        MSubscriptionAckIter {
            current: Bytes::new(self.block),
        }
    }
}

impl<'message> IntoIterator for MSubscriptionAcks<'message> {
    type Item = MSubscriptionAck;
    type IntoIter = MSubscriptionAckIter<'message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MSubscriptionAckIter<'message> {
    current: &'message Bytes,
}

impl Iterator for MSubscriptionAckIter<'_> {
    type Item = MSubscriptionAck;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let ack = MSubscriptionAck::parse(&mut self.current)
            .expect("subscription ack block was validated when it was parsed");

        Some(ack)
    }
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::MSubscriptionAck;
    use super::MSubscriptionAcks;

    #[test]
    fn check_ack_codes() {
        let input = &[0x00, 0x02, 0x80];
        let acks = MSubscriptionAcks::parse(&mut Bytes::new(input)).unwrap();

        let collected: Vec<_> = acks.iter().collect();
        assert_eq!(
            collected,
            vec![
                MSubscriptionAck::MaximumQualityAtMostOnce,
                MSubscriptionAck::MaximumQualityExactlyOnce,
                MSubscriptionAck::Failure,
            ]
        );
    }

    #[test]
    fn check_invalid_ack_code() {
        let input = &[0x00, 0x03];
        MSubscriptionAcks::parse(&mut Bytes::new(input)).unwrap_err();
    }

    #[test]
    fn check_empty_acks_rejected() {
        MSubscriptionAcks::parse(&mut Bytes::new(&[])).unwrap_err();
    }
}
