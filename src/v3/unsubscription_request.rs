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
use crate::topic::validate_topic_filter;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// The non-empty topic filter list of an UNSUBSCRIBE packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MUnsubscriptionRequests<'message> {
    block: &'message [u8],
}

fn parse_filter<'message>(input: &mut &'message Bytes) -> MResult<&'message str> {
    let topic_filter = crate::strings::parse_string(input)?;
    validate_topic_filter(topic_filter).map_err(ErrMode::Cut)?;
    Ok(topic_filter)
}

impl<'message> MUnsubscriptionRequests<'message> {
    pub fn new(block: &'message [u8]) -> MUnsubscriptionRequests<'message> {
        MUnsubscriptionRequests { block }
    }

    pub fn parse(input: &mut &'message Bytes) -> MResult<MUnsubscriptionRequests<'message>> {
        let block = input.finish();

        if block.is_empty() {
            return Err(ErrMode::Cut(DecodeError::PacketLengthMismatch));
        }

        let mut check = Bytes::new(block);
        while !check.is_empty() {
            parse_filter(&mut check)?;
        }

        Ok(MUnsubscriptionRequests { block })
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        if self.block.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut check = Bytes::new(self.block);
        while !check.is_empty() {
            parse_filter(&mut check)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
        }

        u32::try_from(self.block.len()).map_err(|_| EncodeError::PacketTooLarge)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(self.block)
    }

    pub fn iter(&self) -> MUnsubscriptionRequestIter<'message> {
        MUnsubscriptionRequestIter {
            current: Bytes::new(self.block),
        }
    }
}

impl<'message> IntoIterator for MUnsubscriptionRequests<'message> {
    type Item = &'message str;
    type IntoIter = MUnsubscriptionRequestIter<'message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MUnsubscriptionRequestIter<'message> {
    current: &'message Bytes,
}

impl<'message> Iterator for MUnsubscriptionRequestIter<'message> {
    type Item = &'message str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }

        let filter = parse_filter(&mut self.current)
            .expect("unsubscription block was validated when it was parsed");

        Some(filter)
    }
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::MUnsubscriptionRequests;

    #[test]
    fn check_filters() {
        let input = &[0, 3, b'a', b'/', b'b', 0, 1, b'#'];
        let requests = MUnsubscriptionRequests::parse(&mut Bytes::new(input)).unwrap();

        let collected: Vec<_> = requests.iter().collect();
        assert_eq!(collected, vec!["a/b", "#"]);
    }

    #[test]
    fn check_empty_list_rejected() {
        MUnsubscriptionRequests::parse(&mut Bytes::new(&[])).unwrap_err();
    }

    #[test]
    fn check_wildcard_position() {
        let input = &[0, 3, b'#', b'/', b'b'];
        MUnsubscriptionRequests::parse(&mut Bytes::new(input)).unwrap_err();
    }
}
