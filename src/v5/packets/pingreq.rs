//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::Bytes;

use crate::error::EncodeError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[doc = crate::util::md_speclink!("_Toc3901195")]
pub struct MPingreq;

impl MPingreq {
    pub fn parse(input: &mut &Bytes) -> MResult<MPingreq> {
        eof(input)?;
        Ok(MPingreq)
    }

    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(0)
    }

    pub fn write<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }
}
