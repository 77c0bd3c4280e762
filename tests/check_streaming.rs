//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Driving the codec the way a transport would: append bytes, carve off
//! packets, decode them with the version the session negotiated.

use std::num::NonZeroU16;

use mqtt_wire::error::DecodeError;
use mqtt_wire::fixed_header::PacketType;
use mqtt_wire::identifier::PacketIdentifier;
use mqtt_wire::level::parse_protocol_header;
use mqtt_wire::level::ProtocolLevel;
use mqtt_wire::qos::QualityOfService;
use mqtt_wire::streaming::StreamingDecoder;
use mqtt_wire::v3;
use mqtt_wire::v5;
use mqtt_wire::ParserSettings;
use pretty_assertions::assert_eq;
use winnow::Bytes;

const SETTINGS: ParserSettings = ParserSettings {
    strict_client_identifier: false,
};

#[test]
fn split_and_decode_a_v3_session_start() {
    // CONNECT "DIGI", then a QoS 0 PUBLISH, concatenated as they would
    // arrive from a socket
    let mut buffer: Vec<u8> = Vec::new();
    buffer.extend_from_slice(&[
        0x10, 0x10, 0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x04, 0x02, 0x00, 0x3C, 0x00, 0x04, 0x44,
        0x49, 0x47, 0x49,
    ]);
    buffer.extend_from_slice(&[
        0x30, 0x0A, 0x00, 0x04, 0x74, 0x65, 0x73, 0x74, 0x74, 0x65, 0x73, 0x74,
    ]);

    let mut decoder = StreamingDecoder::new(&buffer);

    let header = decoder.next_header().unwrap();
    assert_eq!(header.packet_type(), PacketType::Connect);
    let mut body = decoder.next_packet(&header).unwrap();

    // version detection peeks at the connect body before the session
    // decides which decoder set to use
    let mut peek = body;
    let level = parse_protocol_header(&mut peek).unwrap();
    assert_eq!(level, ProtocolLevel::V3);

    let packet = v3::packet::MPacket::parse_body(&header, &SETTINGS, &mut body).unwrap();
    assert_eq!(
        packet,
        v3::packet::MPacket::Connect(v3::packet::MConnect {
            clean_session: true,
            will: None,
            username: None,
            password: None,
            keep_alive: 60,
            client_id: "DIGI",
        })
    );

    let header = decoder.next_header().unwrap();
    let mut body = decoder.next_packet(&header).unwrap();
    let packet = v3::packet::MPacket::parse_body(&header, &SETTINGS, &mut body).unwrap();

    assert_eq!(
        packet,
        v3::packet::MPacket::Publish(v3::packet::MPublish {
            dup: false,
            qos: QualityOfService::AtMostOnce,
            retain: false,
            topic_name: "test",
            id: None,
            payload: b"test",
        })
    );

    assert_eq!(decoder.consumed(), buffer.len());
}

#[test]
fn trailing_truncated_packet_waits_for_more_bytes() {
    // a complete PUBLISH followed by the first half of another one
    let mut buffer: Vec<u8> = Vec::new();
    buffer.extend_from_slice(&[
        0x34, 0x14, 0x00, 0x05, 0x61, 0x2F, 0x62, 0x2F, 0x63, 0x00, 0x01, 0x68, 0x65, 0x6C, 0x6C,
        0x6F, 0x20, 0x77, 0x6F, 0x72, 0x6C, 0x64,
    ]);
    let second_packet = [
        0x30, 0x0A, 0x00, 0x04, 0x74, 0x65, 0x73, 0x74, 0x74, 0x65, 0x73, 0x74,
    ];
    buffer.extend_from_slice(&second_packet[..6]);

    let mut decoder = StreamingDecoder::new(&buffer);

    let header = decoder.next_header().unwrap();
    let mut body = decoder.next_packet(&header).unwrap();
    let packet = v3::packet::MPacket::parse_body(&header, &SETTINGS, &mut body).unwrap();

    assert_eq!(
        packet,
        v3::packet::MPacket::Publish(v3::packet::MPublish {
            dup: false,
            qos: QualityOfService::ExactlyOnce,
            retain: false,
            topic_name: "a/b/c",
            id: Some(PacketIdentifier(NonZeroU16::new(1).unwrap())),
            payload: b"hello world",
        })
    );

    // the second header is readable, its body is not
    let header = decoder.next_header().unwrap();
    assert_eq!(header.remaining_length(), 10);
    assert_eq!(
        decoder.next_packet(&header).unwrap_err(),
        DecodeError::IncompleteBuffer
    );

    // the transport reads the rest and resumes from the unparsed tail
    let consumed = decoder.consumed();
    buffer.extend_from_slice(&second_packet[6..]);

    let mut decoder = StreamingDecoder::new(&buffer[consumed..]);
    let header = decoder.next_header().unwrap();
    let mut body = decoder.next_packet(&header).unwrap();
    v3::packet::MPacket::parse_body(&header, &SETTINGS, &mut body).unwrap();
    assert_eq!(decoder.unparsed(), &[] as &[u8]);
}

#[test]
fn v5_packets_roundtrip_through_the_streaming_layer() {
    let publish = v5::packets::MqttPacket::Publish(v5::packets::publish::MPublish {
        dup: false,
        qos: QualityOfService::AtLeastOnce,
        retain: true,
        topic_name: "device/7/state",
        packet_identifier: Some(PacketIdentifier(NonZeroU16::new(99).unwrap())),
        properties: v5::packets::publish::PublishProperties::new(),
        payload: b"{\"on\":true}",
    });

    let size = publish.validate().unwrap();
    let mut buffer = vec![0u8; size.buffer_len().unwrap()];
    let written = publish.encode_into(&mut buffer).unwrap();
    assert_eq!(written, buffer.len());

    let mut decoder = StreamingDecoder::new(&buffer);
    let header = decoder.next_header().unwrap();
    assert_eq!(
        header.packet_type(),
        PacketType::Publish {
            dup: false,
            qos: QualityOfService::AtLeastOnce,
            retain: true,
        }
    );

    let mut body = decoder.next_packet(&header).unwrap();
    let decoded = v5::packets::MqttPacket::parse_body(&header, &SETTINGS, &mut body).unwrap();
    assert_eq!(decoded, publish);
}

#[test]
fn v5_short_disconnect_decodes_and_encodes() {
    let buffer = [0xE0, 0x00];

    let packet = v5::packets::MqttPacket::parse_complete(&SETTINGS, &buffer).unwrap();
    assert_eq!(
        packet,
        v5::packets::MqttPacket::Disconnect(v5::packets::disconnect::MDisconnect {
            reason_code: v5::packets::disconnect::DisconnectReasonCode::NormalDisconnection,
            properties: v5::packets::disconnect::DisconnectProperties::new(),
        })
    );

    let mut out = [0u8; 2];
    let written = packet.encode_into(&mut out).unwrap();
    assert_eq!(&out[..written], &buffer);
}

#[test]
fn header_and_packet_sizes_line_up() {
    // for every encoded packet, header size + remaining length equals the
    // buffer length
    let pingreq = v3::packet::MPacket::Pingreq(v3::packet::MPingreq);
    let size = pingreq.validate().unwrap();

    let mut out = [0u8; 2];
    let written = pingreq.encode_into(&mut out).unwrap();
    assert_eq!(written as u32, size.total());

    let decoder = StreamingDecoder::new(&out);
    let header = decoder.next_header().unwrap();
    assert_eq!(
        header.binary_size() + header.remaining_length(),
        written as u32
    );
}

#[test]
fn subscribe_body_decodes_via_the_generic_entry() {
    let body = [0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x02];
    let subs =
        v3::subscription_request::MSubscriptionRequests::parse(&mut Bytes::new(&body)).unwrap();

    let requests: Vec<_> = subs.iter().collect();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].topic_filter, "MQTT");
    assert_eq!(requests[0].qos, QualityOfService::ExactlyOnce);
}

#[test]
fn wrong_version_connect_is_rejected_by_the_other_decoder() {
    // a v5 CONNECT handed to the v3 decoder
    let connect = v5::packets::MqttPacket::Connect(v5::packets::connect::MConnect {
        client_identifier: "cafe",
        username: None,
        password: None,
        clean_start: true,
        will: None,
        properties: v5::packets::connect::ConnectProperties::new(),
        keep_alive: 30,
    });

    let mut buffer = vec![0u8; connect.validate().unwrap().buffer_len().unwrap()];
    connect.encode_into(&mut buffer).unwrap();

    assert_eq!(
        v3::packet::MPacket::parse_complete(&SETTINGS, &buffer).unwrap_err(),
        DecodeError::UnexpectedProtocolLevel
    );
}
