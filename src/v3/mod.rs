//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Decoding and encoding of MQTT 3.1.1 packets, protocol level 4

pub mod connect_return;
pub mod packet;
pub mod subscription_acks;
pub mod subscription_request;
pub mod unsubscription_request;
pub mod will;
