//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Per-packet property sets
//!
//! Every v5 packet admits a fixed subset of properties. The
//! [`define_properties!`] macro turns that subset into a struct with one
//! optional slot per property, a parser that walks the length-prefixed
//! property section, and the matching sizing and write passes.

use winnow::error::ErrMode;

use crate::error::DecodeError;
use crate::MResult;

/// Tracks whether a property has been seen before within one section
pub(crate) struct MqttPropertySlot<T> {
    allow_repeat: bool,
    slot: Option<T>,
}

impl<T> MqttPropertySlot<T> {
    pub(crate) const fn new(allow_repeat: bool) -> MqttPropertySlot<T> {
        MqttPropertySlot {
            allow_repeat,
            slot: None,
        }
    }

    pub(crate) fn use_slot(&mut self, id: u32, new_slot: T) -> MResult<()> {
        if self.slot.is_some() {
            if self.allow_repeat {
                // repeated occurrences stay reachable through the raw block
                // the first occurrence captured
                return Ok(());
            }
            return Err(ErrMode::Cut(DecodeError::DuplicateProperty(id)));
        }

        self.slot = Some(new_slot);
        Ok(())
    }

    pub(crate) fn take_inner(self) -> Option<T> {
        self.slot
    }
}

macro_rules! define_properties {
    (pub struct $name:ident<$lt:lifetime> {
        $( $prop_name:ident : $prop:ty ),* $(,)?
    }) => {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name<$lt> {
            $( pub $prop_name: Option<$prop>, )*
        }

        impl<$lt> $name<$lt> {
            pub fn new() -> Self {
                $name {
                    $( $prop_name: None, )*
                }
            }

            pub fn parse(input: &mut &$lt winnow::Bytes) -> crate::MResult<$name<$lt>> {
                use winnow::Parser;

                $(
                    let mut $prop_name: crate::v5::properties::MqttPropertySlot<$prop> =
                        crate::v5::properties::MqttPropertySlot::new(
                            <$prop as crate::v5::variable_header::MqttProperties>::ALLOW_REPEATING,
                        );
                )*

                let section: &[u8] =
                    winnow::binary::length_take(crate::integers::parse_variable_u32)
                        .parse_next(input)?;
                let mut section = winnow::Bytes::new(section);

                while !section.is_empty() {
                    let id = crate::integers::parse_variable_u32(&mut section)?;

                    $(
                        if id == <$prop as crate::v5::variable_header::MqttProperties>::IDENTIFIER {
                            let value =
                                <$prop as crate::v5::variable_header::MqttProperties>::parse(
                                    &mut section,
                                )?;
                            $prop_name.use_slot(id, value)?;
                            continue;
                        }
                    )*

                    return Err(winnow::error::ErrMode::Cut(
                        crate::error::DecodeError::InvalidProperty(id),
                    ));
                }

                Ok($name {
                    $( $prop_name: $prop_name.take_inner(), )*
                })
            }

            fn content_size(&self) -> Result<u32, crate::error::EncodeError> {
                let mut size = 0u64;

                $(
                    if let Some(value) = self.$prop_name.as_ref() {
                        size += crate::v5::variable_header::MqttProperties::binary_size(value)?;
                    }
                )*

                crate::integers::fit_remaining_length(size)
            }

            /// Encoded size of the whole section, length prefix included
            pub fn binary_size(&self) -> Result<u32, crate::error::EncodeError> {
                let content = self.content_size()?;
                Ok(crate::integers::variable_u32_binary_size(content) + content)
            }

            pub fn write<W: crate::write::WriteMqttPacket>(
                &self,
                buffer: &mut W,
            ) -> crate::write::WResult<W> {
                let content = self.content_size()?;
                crate::integers::write_variable_u32(buffer, content)?;

                $(
                    if let Some(value) = self.$prop_name.as_ref() {
                        crate::v5::variable_header::MqttProperties::write(value, buffer)?;
                    }
                )*

                Ok(())
            }
        }

        impl<$lt> Default for $name<$lt> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
pub(crate) use define_properties;

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use crate::error::DecodeError;
    use crate::v5::variable_header::MessageExpiryInterval;
    use crate::v5::variable_header::PayloadFormatIndicator;
    use crate::v5::variable_header::UserProperties;

    define_properties! {
        pub struct TestProperties<'i> {
            payload_format_indicator: PayloadFormatIndicator,
            message_expiry_interval: MessageExpiryInterval,
            user_properties: UserProperties<'i>,
        }
    }

    #[test]
    fn check_parse_section() {
        let input = [
            9, // section length
            0x01, 0x01, // payload format indicator
            0x02, 0x00, 0x00, 0x00, 0x2A, // message expiry interval
            0x01, 0x01, // payload format indicator, again
        ];

        let err = TestProperties::parse(&mut Bytes::new(&input)).unwrap_err();
        assert_eq!(
            DecodeError::from(err),
            DecodeError::DuplicateProperty(0x01)
        );

        let input = [
            7, // section length
            0x01, 0x01, // payload format indicator
            0x02, 0x00, 0x00, 0x00, 0x2A, // message expiry interval
        ];

        let props = TestProperties::parse(&mut Bytes::new(&input)).unwrap();
        assert_eq!(props.payload_format_indicator, Some(PayloadFormatIndicator(true)));
        assert_eq!(props.message_expiry_interval, Some(MessageExpiryInterval(42)));
        assert!(props.user_properties.is_none());
    }

    #[test]
    fn check_unknown_property_rejected() {
        let input = [
            3, // section length
            0x23, 0x00, 0x05, // topic alias, not in the allowed set
        ];

        let err = TestProperties::parse(&mut Bytes::new(&input)).unwrap_err();
        assert_eq!(DecodeError::from(err), DecodeError::InvalidProperty(0x23));
    }

    #[test]
    fn check_overrunning_section_rejected() {
        let input = [
            4, // section length cuts the expiry interval short
            0x02, 0x00, 0x00, 0x00,
        ];

        let err = TestProperties::parse(&mut Bytes::new(&input)).unwrap_err();
        assert_eq!(DecodeError::from(err), DecodeError::PacketLengthMismatch);
    }

    #[test]
    fn check_repeated_user_properties_survive() {
        let input = [
            14, // section length
            0x26, 0x00, 0x01, b'a', 0x00, 0x01, b'b', //
            0x26, 0x00, 0x01, b'c', 0x00, 0x01, b'd',
        ];

        let props = TestProperties::parse(&mut Bytes::new(&input)).unwrap();
        let pairs: Vec<_> = props.user_properties.unwrap().iter().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].key, "c");
    }

    #[test]
    fn check_section_roundtrip() {
        let input = [
            7, // section length
            0x01, 0x00, //
            0x02, 0x00, 0x00, 0x00, 0x2A,
        ];

        let props = TestProperties::parse(&mut Bytes::new(&input)).unwrap();
        assert_eq!(props.binary_size().unwrap() as usize, input.len());

        let mut writer = crate::test::TestWriter { buffer: Vec::new() };
        props.write(&mut writer).unwrap();
        assert_eq!(writer.buffer, input);
    }
}
