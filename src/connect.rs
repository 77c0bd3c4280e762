//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The parts of CONNECT that both protocol versions share
//!
//! The connect flags byte and the client identifier rules are identical in
//! 3.1.1 and 5.0 apart from naming, so they live here and the per-version
//! packet decoders build on top.

use winnow::error::ErrMode;
use winnow::Bytes;

use crate::error::DecodeError;
use crate::qos::qos_from_bits;
use crate::qos::QualityOfService;
use crate::MResult;
use crate::ParserSettings;

/// The decoded CONNECT flags byte
///
/// Invariants enforced at parse time: the reserved bit is zero, a missing
/// will forces will-QoS 0 and no will-retain, and a password requires a
/// username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectFlags {
    pub username: bool,
    pub password: bool,
    pub will_retain: bool,
    pub will_qos: QualityOfService,
    pub will: bool,
    pub clean_session: bool,
}

impl ConnectFlags {
    pub fn parse(input: &mut &Bytes) -> MResult<ConnectFlags> {
        let byte = winnow::binary::u8(input)?;

        if byte & 0b0000_0001 != 0 {
            return Err(ErrMode::Cut(DecodeError::InvalidConnectFlags));
        }

        let will = byte & 0b0000_0100 != 0;
        let will_qos_bits = (byte & 0b0001_1000) >> 3;
        let will_qos = qos_from_bits(will_qos_bits).map_err(ErrMode::Cut)?;
        let will_retain = byte & 0b0010_0000 != 0;

        if !will && (will_qos != QualityOfService::AtMostOnce || will_retain) {
            return Err(ErrMode::Cut(DecodeError::InvalidConnectFlags));
        }

        let password = byte & 0b0100_0000 != 0;
        let username = byte & 0b1000_0000 != 0;

        if password && !username {
            return Err(ErrMode::Cut(DecodeError::InvalidConnectFlags));
        }

        Ok(ConnectFlags {
            username,
            password,
            will_retain,
            will_qos,
            will,
            clean_session: byte & 0b0000_0010 != 0,
        })
    }

    pub fn to_byte(&self) -> u8 {
        let will_qos: u8 = self.will_qos.into();

        (self.username as u8) << 7
            | (self.password as u8) << 6
            | (self.will_retain as u8) << 5
            | will_qos << 3
            | (self.will as u8) << 2
            | (self.clean_session as u8) << 1
    }
}

/// Check a client identifier against the configured policy
///
/// In lax mode every valid MQTT string goes, including the empty one a
/// server may answer with an assigned identifier. Strict mode applies the
/// 3.1.1 baseline of 1 to 23 characters from `[0-9A-Za-z]`.
pub fn validate_client_identifier(
    client_identifier: &str,
    settings: &ParserSettings,
) -> Result<(), DecodeError> {
    if !settings.strict_client_identifier {
        return Ok(());
    }

    if client_identifier.is_empty() || client_identifier.len() > 23 {
        return Err(DecodeError::InvalidClientIdentifier);
    }

    if !client_identifier.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(DecodeError::InvalidClientIdentifier);
    }

    Ok(())
}
