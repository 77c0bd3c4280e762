//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::error::EncodeError;
use crate::qos::QualityOfService;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// The last will a client deposits with its CONNECT
///
/// The will QoS and retain flag travel in the connect flags byte, the topic
/// and payload in the packet payload. Parsing happens in the CONNECT
/// decoder, which has both halves in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MLastWill<'message> {
    pub topic: &'message str,
    pub payload: &'message [u8],
    pub qos: QualityOfService,
    pub retain: bool,
}

impl MLastWill<'_> {
    pub fn binary_size(&self) -> Result<u32, EncodeError> {
        Ok(crate::strings::string_binary_size(self.topic)?
            + crate::bytes::binary_data_binary_size(self.payload)?)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::strings::write_string(buffer, self.topic)?;
        crate::bytes::write_binary_data(buffer, self.payload)
    }
}
