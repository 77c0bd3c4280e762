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

pub fn parse_bool(input: &mut &Bytes) -> MResult<bool> {
    let byte = winnow::binary::u8(input)?;
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ErrMode::Cut(DecodeError::InvalidBool(byte))),
    }
}

#[inline]
pub fn write_bool<W: WriteMqttPacket>(buffer: &mut W, b: bool) -> WResult<W> {
    buffer.write_byte(b as u8)
}

#[cfg(test)]
mod tests {
    use winnow::error::ErrMode;
    use winnow::Bytes;

    use super::parse_bool;
    use crate::error::DecodeError;

    #[test]
    fn check_bool() {
        assert!(!parse_bool(&mut Bytes::new(&[0x00])).unwrap());
        assert!(parse_bool(&mut Bytes::new(&[0x01])).unwrap());
        assert_eq!(
            parse_bool(&mut Bytes::new(&[0x02])).unwrap_err(),
            ErrMode::Cut(DecodeError::InvalidBool(2))
        );
    }
}
