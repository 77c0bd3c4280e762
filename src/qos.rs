//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::error::ErrMode;
use winnow::Bytes;

use crate::error::DecodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum QualityOfService {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

/// Convert the two QoS bits of a flag field
///
/// The bit pattern `0b11` is invalid everywhere it could occur.
pub(crate) fn qos_from_bits(bits: u8) -> Result<QualityOfService, DecodeError> {
    QualityOfService::try_from(bits).map_err(|_| DecodeError::InvalidQualityOfService(bits))
}

pub fn parse_qos(input: &mut &Bytes) -> MResult<QualityOfService> {
    let byte = winnow::binary::u8(input)?;
    QualityOfService::try_from(byte)
        .map_err(|_| ErrMode::Cut(DecodeError::InvalidQualityOfService(byte)))
}

#[inline]
pub fn write_qos<W: WriteMqttPacket>(buffer: &mut W, qos: QualityOfService) -> WResult<W> {
    buffer.write_byte(qos.into())
}

/// The restricted QoS range of the v5 maximum-QoS property
///
/// A server that supports QoS 2 simply omits the property, so only 0 and 1
/// are representable.
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MaximumQualityOfService {
    AtMostOnce = 0,
    AtLeastOnce = 1,
}
