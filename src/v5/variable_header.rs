//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The v5 property vocabulary
//!
//! One type per property identifier, each knowing how to parse, size and
//! write itself, plus the identifier-to-payload-type registry that drives
//! skipping over properties when iterating the repeatable ones.

use core::num::NonZeroU16;
use core::num::NonZeroU32;

use winnow::error::ErrMode;
use winnow::Bytes;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::qos::MaximumQualityOfService;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// What a property with a given identifier can do
///
/// Implemented by every property type; the per-packet property sets in
/// [`crate::v5::properties`] are driven by these constants.
pub trait MqttProperties<'lt>: Sized {
    const IDENTIFIER: u32;
    const ALLOW_REPEATING: bool;

    fn parse(input: &mut &'lt Bytes) -> MResult<Self>;

    /// Encoded size including the identifier
    fn binary_size(&self) -> Result<u64, EncodeError>;

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W>;
}

/// The payload shape belonging to a property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Byte,
    TwoByteInteger,
    FourByteInteger,
    VariableByteInteger,
    BinaryData,
    Utf8String,
    Utf8StringPair,
}

/// Look up the payload type of a property identifier
pub fn property_type(id: u32) -> Option<PropertyType> {
    Some(match id {
        0x01 | 0x17 | 0x19 | 0x24 | 0x25 | 0x28 | 0x29 | 0x2A => PropertyType::Byte,
        0x13 | 0x21 | 0x22 | 0x23 => PropertyType::TwoByteInteger,
        0x02 | 0x11 | 0x18 | 0x27 => PropertyType::FourByteInteger,
        0x0B => PropertyType::VariableByteInteger,
        0x09 | 0x16 => PropertyType::BinaryData,
        0x03 | 0x08 | 0x12 | 0x15 | 0x1A | 0x1C | 0x1F => PropertyType::Utf8String,
        0x26 => PropertyType::Utf8StringPair,
        _ => return None,
    })
}

/// Consume the payload of an already validated property
pub(crate) fn skip_property(id: u32, input: &mut &Bytes) -> MResult<()> {
    match property_type(id) {
        Some(PropertyType::Byte) => {
            winnow::binary::u8(input)?;
        }
        Some(PropertyType::TwoByteInteger) => {
            crate::integers::parse_u16(input)?;
        }
        Some(PropertyType::FourByteInteger) => {
            crate::integers::parse_u32(input)?;
        }
        Some(PropertyType::VariableByteInteger) => {
            crate::integers::parse_variable_u32(input)?;
        }
        Some(PropertyType::BinaryData) => {
            crate::bytes::parse_binary_data(input)?;
        }
        Some(PropertyType::Utf8String) => {
            crate::strings::parse_string(input)?;
        }
        Some(PropertyType::Utf8StringPair) => {
            crate::strings::string_pair(input)?;
        }
        None => return Err(ErrMode::Cut(DecodeError::InvalidProperty(id))),
    }

    Ok(())
}

macro_rules! define_property {
    ($name:ident as $id:expr => u32) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub u32);

        impl<'lt> MqttProperties<'lt> for $name {
            const IDENTIFIER: u32 = $id;
            const ALLOW_REPEATING: bool = false;

            fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
                Ok(Self(crate::integers::parse_u32(input)?))
            }

            fn binary_size(&self) -> Result<u64, EncodeError> {
                Ok(1 + 4)
            }

            fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
                buffer.write_u32(self.0)
            }
        }
    };

    ($name:ident as $id:expr => u16) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub u16);

        impl<'lt> MqttProperties<'lt> for $name {
            const IDENTIFIER: u32 = $id;
            const ALLOW_REPEATING: bool = false;

            fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
                Ok(Self(crate::integers::parse_u16(input)?))
            }

            fn binary_size(&self) -> Result<u64, EncodeError> {
                Ok(1 + 2)
            }

            fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
                buffer.write_u16(self.0)
            }
        }
    };

    ($name:ident as $id:expr => bool) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub bool);

        impl<'lt> MqttProperties<'lt> for $name {
            const IDENTIFIER: u32 = $id;
            const ALLOW_REPEATING: bool = false;

            fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
                Ok(Self(crate::boolean::parse_bool(input)?))
            }

            fn binary_size(&self) -> Result<u64, EncodeError> {
                Ok(1 + 1)
            }

            fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
                crate::boolean::write_bool(buffer, self.0)
            }
        }
    };

    ($name:ident<$lt:lifetime> as $id:expr => str) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name<$lt>(pub &$lt str);

        impl<$lt> MqttProperties<$lt> for $name<$lt> {
            const IDENTIFIER: u32 = $id;
            const ALLOW_REPEATING: bool = false;

            fn parse(input: &mut &$lt Bytes) -> MResult<Self> {
                Ok(Self(crate::strings::parse_string(input)?))
            }

            fn binary_size(&self) -> Result<u64, EncodeError> {
                Ok(1 + crate::strings::string_binary_size(self.0)? as u64)
            }

            fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
                crate::strings::write_string(buffer, self.0)
            }
        }
    };

    ($name:ident<$lt:lifetime> as $id:expr => binary) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name<$lt>(pub &$lt [u8]);

        impl<$lt> MqttProperties<$lt> for $name<$lt> {
            const IDENTIFIER: u32 = $id;
            const ALLOW_REPEATING: bool = false;

            fn parse(input: &mut &$lt Bytes) -> MResult<Self> {
                Ok(Self(crate::bytes::parse_binary_data(input)?))
            }

            fn binary_size(&self) -> Result<u64, EncodeError> {
                Ok(1 + crate::bytes::binary_data_binary_size(self.0)? as u64)
            }

            fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
                crate::bytes::write_binary_data(buffer, self.0)
            }
        }
    };

    ($name:ident as $id:expr => nonzero_u16) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub NonZeroU16);

        impl<'lt> MqttProperties<'lt> for $name {
            const IDENTIFIER: u32 = $id;
            const ALLOW_REPEATING: bool = false;

            fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
                let value = crate::integers::parse_u16(input)?;
                match NonZeroU16::new(value) {
                    Some(value) => Ok(Self(value)),
                    None => Err(ErrMode::Cut(DecodeError::InvalidPropertyPayload($id))),
                }
            }

            fn binary_size(&self) -> Result<u64, EncodeError> {
                Ok(1 + 2)
            }

            fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
                buffer.write_u16(self.0.get())
            }
        }
    };
}

define_property!(PayloadFormatIndicator as 0x01 => bool);
define_property!(MessageExpiryInterval as 0x02 => u32);
define_property!(ContentType<'i> as 0x03 => str);
define_property!(ResponseTopic<'i> as 0x08 => str);
define_property!(CorrelationData<'i> as 0x09 => binary);
define_property!(SessionExpiryInterval as 0x11 => u32);
define_property!(AssignedClientIdentifier<'i> as 0x12 => str);
define_property!(ServerKeepAlive as 0x13 => u16);
define_property!(AuthenticationMethod<'i> as 0x15 => str);
define_property!(AuthenticationData<'i> as 0x16 => binary);
define_property!(RequestProblemInformation as 0x17 => bool);
define_property!(WillDelayInterval as 0x18 => u32);
define_property!(RequestResponseInformation as 0x19 => bool);
define_property!(ResponseInformation<'i> as 0x1A => str);
define_property!(ServerReference<'i> as 0x1C => str);
define_property!(ReasonString<'i> as 0x1F => str);
define_property!(ReceiveMaximum as 0x21 => nonzero_u16);
define_property!(TopicAliasMaximum as 0x22 => u16);
define_property!(TopicAlias as 0x23 => nonzero_u16);
define_property!(RetainAvailable as 0x25 => bool);
define_property!(WildcardSubscriptionAvailable as 0x28 => bool);
define_property!(SubscriptionIdentifiersAvailable as 0x29 => bool);
define_property!(SharedSubscriptionAvailable as 0x2A => bool);

/// The v5 maximum-packet-size property, non-zero by definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximumPacketSize(pub NonZeroU32);

impl<'lt> MqttProperties<'lt> for MaximumPacketSize {
    const IDENTIFIER: u32 = 0x27;
    const ALLOW_REPEATING: bool = false;

    fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
        let value = crate::integers::parse_u32(input)?;
        match NonZeroU32::new(value) {
            Some(value) => Ok(Self(value)),
            None => Err(ErrMode::Cut(DecodeError::InvalidPropertyPayload(
                Self::IDENTIFIER,
            ))),
        }
    }

    fn binary_size(&self) -> Result<u64, EncodeError> {
        Ok(1 + 4)
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
        buffer.write_u32(self.0.get())
    }
}

/// The v5 maximum-QoS property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximumQoS(pub MaximumQualityOfService);

impl<'lt> MqttProperties<'lt> for MaximumQoS {
    const IDENTIFIER: u32 = 0x24;
    const ALLOW_REPEATING: bool = false;

    fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
        let byte = winnow::binary::u8(input)?;
        MaximumQualityOfService::try_from(byte)
            .map(Self)
            .map_err(|_| ErrMode::Cut(DecodeError::InvalidPropertyPayload(Self::IDENTIFIER)))
    }

    fn binary_size(&self) -> Result<u64, EncodeError> {
        Ok(1 + 1)
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
        buffer.write_byte(self.0.into())
    }
}

fn parse_subscription_identifier(input: &mut &Bytes) -> MResult<NonZeroU32> {
    let value = crate::integers::parse_variable_u32(input)?;
    NonZeroU32::new(value).ok_or(ErrMode::Cut(DecodeError::InvalidPropertyPayload(
        SubscriptionIdentifiers::IDENTIFIER,
    )))
}

/// All subscription identifiers attached to a packet
///
/// The property is repeatable in PUBLISH and SUBSCRIBE, so its zero-copy
/// representation is a raw property-stream block: the first identifier's
/// payload verbatim, every further occurrence `0x0B`-prefixed in stream
/// order (interleaved foreign properties are skipped while iterating).
/// Decoding produces exactly that shape; for encoding, build the block the
/// same way.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionIdentifiers<'i>(pub &'i [u8]);

impl<'i> SubscriptionIdentifiers<'i> {
    pub fn iter(&self) -> SubscriptionIdentifierIter<'i> {
        SubscriptionIdentifierIter {
            current: Bytes::new(self.0),
            first: true,
        }
    }

    fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        E: From<EncodeError>,
        F: FnMut(NonZeroU32) -> Result<(), E>,
    {
        let mut input = Bytes::new(self.0);
        let mut first = true;

        while first || !input.is_empty() {
            if first {
                first = false;
            } else {
                let id = crate::integers::parse_variable_u32(&mut input)
                    .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
                if id != Self::IDENTIFIER {
                    skip_property(id, &mut input)
                        .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
                    continue;
                }
            }

            let value = parse_subscription_identifier(&mut input)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
            f(value)?;
        }

        Ok(())
    }
}

impl<'lt> MqttProperties<'lt> for SubscriptionIdentifiers<'lt> {
    const IDENTIFIER: u32 = 0x0B;
    const ALLOW_REPEATING: bool = true;

    fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
        let block: &'lt [u8] = *input;
        parse_subscription_identifier(input)?;
        Ok(Self(block))
    }

    fn binary_size(&self) -> Result<u64, EncodeError> {
        let mut size = 0u64;
        self.try_for_each::<EncodeError, _>(|value| {
            size += 1 + crate::integers::variable_u32_binary_size(value.get()) as u64;
            Ok(())
        })?;
        Ok(size)
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.try_for_each::<W::Error, _>(|value| {
            crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
            crate::integers::write_variable_u32(buffer, value.get())
        })
    }
}

impl PartialEq for SubscriptionIdentifiers<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionIdentifierIter<'i> {
    current: &'i Bytes,
    first: bool,
}

impl Iterator for SubscriptionIdentifierIter<'_> {
    type Item = NonZeroU32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.first {
            self.first = false;
            if self.current.is_empty() {
                return None;
            }
            let value = parse_subscription_identifier(&mut self.current)
                .expect("subscription identifier block was validated at parse time");
            return Some(value);
        }

        while !self.current.is_empty() {
            let id = crate::integers::parse_variable_u32(&mut self.current)
                .expect("property block was validated at parse time");
            if id == SubscriptionIdentifiers::IDENTIFIER {
                let value = parse_subscription_identifier(&mut self.current)
                    .expect("subscription identifier block was validated at parse time");
                return Some(value);
            }
            skip_property(id, &mut self.current)
                .expect("property block was validated at parse time");
        }

        None
    }
}

/// One user property, a free-form key/value pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserProperty<'i> {
    pub key: &'i str,
    pub value: &'i str,
}

/// All user properties attached to a packet
///
/// Repeatable everywhere, represented like
/// [`SubscriptionIdentifiers`]: the first pair's payload verbatim, further
/// occurrences `0x26`-prefixed, foreign properties skipped while iterating.
/// Equality compares the iterated pairs, not the raw block.
#[derive(Debug, Clone, Copy)]
pub struct UserProperties<'i>(pub &'i [u8]);

impl<'i> UserProperties<'i> {
    pub fn iter(&self) -> UserPropertyIter<'i> {
        UserPropertyIter {
            current: Bytes::new(self.0),
            first: true,
        }
    }

    fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        E: From<EncodeError>,
        F: FnMut(UserProperty<'i>) -> Result<(), E>,
    {
        let mut input = Bytes::new(self.0);
        let mut first = true;

        while first || !input.is_empty() {
            if first {
                first = false;
            } else {
                let id = crate::integers::parse_variable_u32(&mut input)
                    .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
                if id != Self::IDENTIFIER {
                    skip_property(id, &mut input)
                        .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
                    continue;
                }
            }

            let (key, value) = crate::strings::string_pair(&mut input)
                .map_err(|e| EncodeError::InvalidPayload(DecodeError::from(e)))?;
            f(UserProperty { key, value })?;
        }

        Ok(())
    }
}

impl<'lt> MqttProperties<'lt> for UserProperties<'lt> {
    const IDENTIFIER: u32 = 0x26;
    const ALLOW_REPEATING: bool = true;

    fn parse(input: &mut &'lt Bytes) -> MResult<Self> {
        let block: &'lt [u8] = *input;
        crate::strings::string_pair(input)?;
        Ok(Self(block))
    }

    fn binary_size(&self) -> Result<u64, EncodeError> {
        let mut size = 0u64;
        self.try_for_each::<EncodeError, _>(|pair| {
            size += 1
                + crate::strings::string_binary_size(pair.key)? as u64
                + crate::strings::string_binary_size(pair.value)? as u64;
            Ok(())
        })?;
        Ok(size)
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.try_for_each::<W::Error, _>(|pair| {
            crate::integers::write_variable_u32(buffer, Self::IDENTIFIER)?;
            crate::strings::write_string(buffer, pair.key)?;
            crate::strings::write_string(buffer, pair.value)
        })
    }
}

impl PartialEq for UserProperties<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UserPropertyIter<'i> {
    current: &'i Bytes,
    first: bool,
}

impl<'i> Iterator for UserPropertyIter<'i> {
    type Item = UserProperty<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.first {
            self.first = false;
            if self.current.is_empty() {
                return None;
            }
            let (key, value) = crate::strings::string_pair(&mut self.current)
                .expect("user property block was validated at parse time");
            return Some(UserProperty { key, value });
        }

        while !self.current.is_empty() {
            let id = crate::integers::parse_variable_u32(&mut self.current)
                .expect("property block was validated at parse time");
            if id == UserProperties::IDENTIFIER {
                let (key, value) = crate::strings::string_pair(&mut self.current)
                    .expect("user property block was validated at parse time");
                return Some(UserProperty { key, value });
            }
            skip_property(id, &mut self.current)
                .expect("property block was validated at parse time");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::MqttProperties;
    use super::PropertyType;
    use super::SubscriptionIdentifiers;
    use super::UserProperties;
    use super::UserProperty;

    #[test]
    fn check_property_registry() {
        assert_eq!(super::property_type(0x01), Some(PropertyType::Byte));
        assert_eq!(super::property_type(0x26), Some(PropertyType::Utf8StringPair));
        assert_eq!(super::property_type(0x0B), Some(PropertyType::VariableByteInteger));
        assert_eq!(super::property_type(0x04), None);
    }

    #[test]
    fn check_user_property_iteration() {
        // first pair bare, second 0x26-prefixed
        let block = &[
            0x0, 0x1, b'a', 0x0, 0x1, b'b', //
            0x26, 0x0, 0x1, b'c', 0x0, 0x1, b'd',
        ];
        let props = UserProperties(block);

        let collected: Vec<_> = props.iter().collect();
        assert_eq!(
            collected,
            vec![
                UserProperty {
                    key: "a",
                    value: "b"
                },
                UserProperty {
                    key: "c",
                    value: "d"
                },
            ]
        );

        // sizing covers both entries: 2 * (1 + 3 + 3)
        assert_eq!(props.binary_size().unwrap(), 14);
    }

    #[test]
    fn check_user_property_skips_foreign_entries() {
        // the decoded block keeps whatever followed in the section, here a
        // message expiry interval between the two pairs
        let block = &[
            0x0, 0x1, b'a', 0x0, 0x1, b'b', //
            0x02, 0x00, 0x00, 0x00, 0x2A, //
            0x26, 0x0, 0x1, b'c', 0x0, 0x1, b'd',
        ];
        let props = UserProperties(block);

        assert_eq!(props.iter().count(), 2);
        // equality ignores the interleaved property
        let clean = &[
            0x0, 0x1, b'a', 0x0, 0x1, b'b', //
            0x26, 0x0, 0x1, b'c', 0x0, 0x1, b'd',
        ];
        assert_eq!(props, UserProperties(clean));
    }

    #[test]
    fn check_subscription_identifier_parse_rejects_zero() {
        let mut input = Bytes::new(&[0x00u8]);
        SubscriptionIdentifiers::parse(&mut input).unwrap_err();
    }

    #[test]
    fn check_subscription_identifier_iteration() {
        let block = &[0x7F, 0x0B, 0x80, 0x01];
        let ids = SubscriptionIdentifiers(block);

        let collected: Vec<u32> = ids.iter().map(|v| v.get()).collect();
        assert_eq!(collected, vec![127, 128]);
        assert_eq!(ids.binary_size().unwrap(), 2 + 3);
    }
}
