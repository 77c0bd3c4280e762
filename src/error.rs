//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The closed set of errors this codec can produce
//!
//! Decoding either yields a fully validated packet or exactly one of these
//! kinds describing the first problem found. Nothing is retried and no
//! foreign error types are wrapped; the caller decides whether an error
//! terminates the connection.

use winnow::error::ErrMode;
use winnow::error::ErrorKind;
use winnow::error::ParserError;
use winnow::stream::Stream;

/// Everything that can go wrong while decoding a packet
///
/// [`DecodeError::IncompleteBuffer`] is special: it is not a protocol
/// violation but a signal that the transport should read more bytes and try
/// again. Every other kind is a hard error for the current packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("more bytes are needed before a complete packet can be decoded")]
    IncompleteBuffer,
    #[error("the packet body did not match its declared remaining length")]
    PacketLengthMismatch,
    #[error("the total packet size is not addressable on this target")]
    PacketTooLarge,
    #[error("{0} is not a valid control packet type")]
    InvalidMessageType(u8),
    #[error("the fixed header flags {0:#06b} contradict the required pattern")]
    InvalidFlags(u8),
    #[error("{0} is not a valid quality of service")]
    InvalidQualityOfService(u8),
    #[error("overlong or non-canonical variable byte integer")]
    InvalidVariableInteger,
    #[error("a boolean byte must be 0 or 1, got {0}")]
    InvalidBool(u8),
    #[error("string data is not valid UTF-8")]
    InvalidUtf8,
    #[error("string data contains a forbidden U+0000 character")]
    NullCharacter,
    #[error("a topic filter must not be empty")]
    EmptyFilter,
    #[error("a topic name must not contain wildcard characters")]
    WildcardInTopic,
    #[error("wildcards must stand alone in their filter level, '#' only in the last")]
    InvalidWildcardPlacement,
    #[error("the protocol name is not 'MQTT'")]
    InvalidProtocolName,
    #[error("{0} is not a supported protocol level")]
    InvalidProtocolLevel(u8),
    #[error("a packet identifier must not be zero")]
    InvalidPacketIdentifier,
    #[error("the client identifier violates the strict 3.1.1 rules")]
    InvalidClientIdentifier,
    #[error("the connect flags byte violates its reserved or consistency rules")]
    InvalidConnectFlags,
    #[error("CONNACK announces a present session together with a rejection")]
    InvalidConnack,
    #[error("{0:#04x} is not a valid return or reason code for this packet")]
    InvalidReturnCode(u8),
    #[error("{0:#04x} is not a valid SUBACK result code")]
    InvalidSubackCode(u8),
    #[error("property {0:#04x} is not allowed in this packet")]
    InvalidProperty(u32),
    #[error("property {0:#04x} may appear at most once per packet")]
    DuplicateProperty(u32),
    #[error("the payload of property {0:#04x} is outside its allowed range")]
    InvalidPropertyPayload(u32),
    #[error("the packet uses a different protocol level than asserted")]
    UnexpectedProtocolLevel,
    #[error("the packet has a different type than asserted")]
    UnexpectedMessageType,
    #[error("expected {expected} bytes, found {actual}")]
    UnexpectedLength { expected: usize, actual: usize },
}

// Lets stock winnow combinators fail inside bounded packet bodies. Running
// out of bytes in a body is by definition a length mismatch; every more
// specific kind is raised explicitly with `ErrMode::Cut`.
impl<I: Stream> ParserError<I> for DecodeError {
    fn from_error_kind(_input: &I, _kind: ErrorKind) -> Self {
        DecodeError::PacketLengthMismatch
    }

    fn append(self, _input: &I, _token_start: &I::Checkpoint, _kind: ErrorKind) -> Self {
        self
    }
}

impl From<ErrMode<DecodeError>> for DecodeError {
    fn from(err: ErrMode<DecodeError>) -> Self {
        match err {
            ErrMode::Incomplete(_) => DecodeError::IncompleteBuffer,
            ErrMode::Backtrack(err) | ErrMode::Cut(err) => err,
        }
    }
}

/// Everything that can go wrong while sizing or writing a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("a string or binary field of {0} bytes exceeds the 65535 byte wire limit")]
    InvalidStringLength(usize),
    #[error("string data contains a forbidden U+0000 character")]
    NullCharacter,
    #[error("the packet exceeds the maximum encodable size")]
    PacketTooLarge,
    #[error("the output buffer is too small for the packet")]
    BufferTooSmall,
    #[error("the packet identifier contradicts the quality of service")]
    InvalidPacketIdentifier,
    #[error("a payload sequence that must not be empty is empty")]
    EmptyPayload,
    #[error("a raw payload block failed validation: {0}")]
    InvalidPayload(DecodeError),
}
