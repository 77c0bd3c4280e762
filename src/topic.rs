//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Topic name and topic filter validation
//!
//! Topic names are publish targets and must not contain wildcards. Topic
//! filters are subscription patterns: `+` matches one level, `#` matches the
//! rest, and both are only valid as an entire level, `#` only as the last.
//! Everything here works on borrowed `&str` without allocating.

use crate::error::DecodeError;

/// The topic level separator
///
/// Defined in 4.7.1.1
pub const TOPIC_LEVEL_SEPARATOR: char = '/';

/// Check that `topic` is a valid publish topic name
///
/// A topic name is any MQTT string without wildcard characters. The empty
/// check and UTF-8 rules are handled by the string layer.
pub fn validate_topic_name(topic: &str) -> Result<(), DecodeError> {
    if topic.contains(['+', '#']) {
        return Err(DecodeError::WildcardInTopic);
    }

    Ok(())
}

/// Check that `filter` is a valid subscription topic filter
///
/// Defined in 4.7.1
pub fn validate_topic_filter(filter: &str) -> Result<(), DecodeError> {
    if filter.is_empty() {
        return Err(DecodeError::EmptyFilter);
    }

    let mut levels = filter.split(TOPIC_LEVEL_SEPARATOR).peekable();

    while let Some(level) = levels.next() {
        match level {
            "+" => {}
            "#" => {
                if levels.peek().is_some() {
                    return Err(DecodeError::InvalidWildcardPlacement);
                }
            }
            _ => {
                if level.contains(['+', '#']) {
                    return Err(DecodeError::InvalidWildcardPlacement);
                }
            }
        }
    }

    Ok(())
}
