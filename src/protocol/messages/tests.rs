//! Parser and encoder tests over a small in-memory catalog.
use super::*;
use crate::core::FieldValue;
use crate::error::{EncodeError, ReassemblyError};
use crate::protocol::schema::SchemaRegistry;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use serde_json::json;
use std::sync::Arc;

fn registry() -> Arc<SchemaRegistry> {
    let catalog = json!({ "PGNs": [
        { "pgn": 59904, "id": "isoRequest", "priority": 6, "fields": [
            { "id": "pgn", "bitLength": 24 }
        ]},
        { "pgn": 127505, "id": "fluidLevel", "priority": 6, "fields": [
            { "id": "instance", "bitLength": 4 },
            { "id": "type", "bitLength": 4, "type": "Lookup table",
              "enumValues": [{ "name": "Fuel", "value": 0 }, { "name": "Water", "value": 1 }] },
            { "id": "level", "bitLength": 16, "signed": true, "resolution": 0.004 },
            { "id": "capacity", "bitLength": 32, "resolution": 0.0001 },
            { "id": "reserved", "bitLength": 8 }
        ]},
        { "pgn": 127489, "id": "engineParametersDynamic", "priority": 2, "fields": [
            { "id": "instance", "bitLength": 8 },
            { "id": "oilPressure", "bitLength": 16, "resolution": 100 },
            { "id": "oilTemperature", "bitLength": 16, "resolution": 0.1 },
            { "id": "temperature", "bitLength": 16, "resolution": 0.01 },
            { "id": "alternatorPotential", "bitLength": 16, "signed": true, "resolution": 0.01 },
            { "id": "fuelRate", "bitLength": 16, "signed": true, "resolution": 0.1 }
        ]}
    ]});
    Arc::new(SchemaRegistry::from_json(&catalog.to_string()).unwrap())
}

const FLUID_LEVEL: [u8; 8] = [0x13, 0x0D, 0x5E, 0xFC, 0x08, 0x00, 0x00, 0xFF];

fn engine_message() -> OutgoingMessage {
    OutgoingMessage::for_pgn(127489)
        .source(0x11)
        .field("instance", 1u8)
        .field("oilPressure", 250_000.0)
        .field("oilTemperature", 353.2)
        .field("alternatorPotential", -1.5)
}

//==================================================================================PARSER
#[test]
/// A single-frame PGN decodes straight from one frame.
fn test_parse_single_frame() {
    let mut parser = Parser::new(registry());
    let frame = CanFrame::new(CanId(0x19F21123), FLUID_LEVEL);
    let packet = parser.parse(&frame).unwrap().into_packet().unwrap();

    assert_eq!(packet.pgn, 127505);
    assert_eq!(packet.priority(), 6);
    assert_eq!(packet.source(), 0x23);
    assert_eq!(packet.destination(), 0xFF);
    assert_eq!(packet.schema_id(), "fluidLevel");
    assert_eq!(packet.field("instance"), Some(&FieldValue::U64(3)));
    assert_eq!(packet.label("type"), Some("Water"));
    assert_eq!(packet.label("instance"), None);
    assert_eq!(packet.field("reserved"), Some(&FieldValue::Null));
    assert!(packet.sequence.is_none());
    assert_eq!(packet.message_key(), "19f2112303");
    assert_eq!(packet.fields().len(), 5);
}

#[test]
/// Multi-frame PGNs yield pending states, then the packet.
fn test_parse_fast_packet() {
    let registry = registry();
    let encoded = Encoder::new(Arc::clone(&registry)).encode(&engine_message()).unwrap();
    assert_eq!(encoded.frames.len(), 2);

    let mut parser = Parser::new(registry);
    let first = parser.parse(&encoded.frames[0]).unwrap();
    match &first {
        Parsed::Pending(state) => {
            assert_eq!(state.sequence_id, 5);
            assert_eq!(state.total_bytes, Some(11));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(first.packet().is_none());

    let packet = parser.parse(&encoded.frames[1]).unwrap().into_packet().unwrap();
    assert_eq!(packet.payload, encoded.payload);
    assert_eq!(
        packet.sequence,
        Some(SequenceInfo {
            sequence_id: 5,
            total_frames: 2
        })
    );
    assert_eq!(packet.field("oilPressure").and_then(FieldValue::as_f64), Some(250_000.0));
    assert_eq!(packet.field("alternatorPotential").and_then(FieldValue::as_f64), Some(-1.5));
    assert_eq!(packet.field("temperature"), Some(&FieldValue::F64(0.0)));
    assert!(parser.reassembler().is_empty());
}

#[test]
/// Complete frames skip reassembly even for multi-frame PGNs.
fn test_parse_complete_frame() {
    let registry = registry();
    let encoded = Encoder::new(Arc::clone(&registry)).encode(&engine_message()).unwrap();
    let frame = CanFrame::complete(encoded.id, encoded.payload.clone()).with_timestamp("2024-05-01T10:00:00Z");

    let mut parser = Parser::new(registry);
    let packet = parser.parse(&frame).unwrap().into_packet().unwrap();
    assert_eq!(packet.field("instance"), Some(&FieldValue::U64(1)));
    assert_eq!(packet.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
    assert!(packet.sequence.is_none());
}

#[test]
/// PGNs missing from the catalog decode with the not-found schema.
fn test_parse_unknown_pgn() {
    let mut parser = Parser::new(registry());
    let frame = CanFrame::new(CanId(0x19F80123), [1, 2, 3, 4, 5, 6, 7, 8]);
    let packet = parser.parse(&frame).unwrap().into_packet().unwrap();
    assert_eq!(packet.schema_id(), "notFound");
    assert_eq!(
        packet.field("unknownData"),
        Some(&FieldValue::Bytes(vec![1, 2, 3, 4, 5, 6, 7, 8]))
    );
}

#[test]
/// An overrun surfaces as an error and leaves the parser usable.
fn test_parse_overrun() {
    let mut parser = Parser::new(registry());
    // 127489 is multi-frame: frame 0 announces 4 bytes (one frame) after
    // two continuation frames.
    let id = CanId::builder(127489, 0x11).with_priority(2).build();
    parser.parse(&CanFrame::new(id, [0x01, 1, 2, 3, 4, 5, 6, 7])).unwrap();
    parser.parse(&CanFrame::new(id, [0x02, 1, 2, 3, 4, 5, 6, 7])).unwrap();
    let result = parser.parse(&CanFrame::new(id, [0x00, 4, 1, 2, 3, 4, 0xFF, 0xFF]));
    assert!(matches!(result, Err(ReassemblyError::Overrun { .. })));
    assert!(parser.reassembler().is_empty());
}

#[test]
/// Batches list single frames first, then one result per sequence.
fn test_parse_batch() {
    let registry = registry();
    let mut encoder = Encoder::new(Arc::clone(&registry));
    let first = encoder.encode(&engine_message()).unwrap();
    let second = encoder.encode(&engine_message().field("instance", 2u8)).unwrap();
    let fluid = CanFrame::new(CanId(0x19F21123), FLUID_LEVEL);

    // Second sequence only half delivered.
    let frames = vec![
        first.frames[0].clone(),
        fluid.clone(),
        second.frames[0].clone(),
        first.frames[1].clone(),
        fluid,
        CanFrame::new(first.id, Vec::<u8>::new()),
    ];
    let results = Parser::new(registry).parse_batch(&frames);

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].packet().map(Packet::schema_id), Some("fluidLevel"));
    assert_eq!(results[1].packet().map(Packet::schema_id), Some("fluidLevel"));
    let engine = results[2].packet().expect("first sequence complete");
    assert_eq!(engine.field("instance"), Some(&FieldValue::U64(1)));
    match &results[3] {
        Parsed::Pending(state) => assert_eq!(state.sequence_id, 6),
        other => panic!("unexpected {other:?}"),
    }
}

//==================================================================================ENCODER
#[test]
/// Fluid level encodes to the reference payload in one frame.
fn test_encode_single_frame() {
    let mut encoder = Encoder::new(registry());
    let message = OutgoingMessage::for_id("fluidLevel")
        .source(0x23)
        .destination(12)
        .field("instance", 3u8)
        .field("type", "Water")
        .field("level", 96.3095179092194)
        .field("capacity", 0.23);
    let encoded = encoder.encode(&message).unwrap();

    assert_eq!(encoded.payload, FLUID_LEVEL);
    // Broadcast PGN: the destination is dropped.
    assert_eq!(encoded.id, CanId(0x19F21123));
    assert_eq!(encoded.frames.len(), 1);
    assert_eq!(encoded.frames[0].data, FLUID_LEVEL);
}

#[test]
/// Addressed PGNs carry the destination; it defaults to global.
fn test_encode_addressed() {
    let mut encoder = Encoder::new(registry());
    let request = OutgoingMessage::for_pgn(59904).source(1).field("pgn", 60928u32);

    let global = encoder.encode(&request).unwrap();
    assert_eq!(global.payload, [0x00, 0xEE, 0x00]);
    assert_eq!(global.id, CanId(0x18EAFF01));

    let addressed = encoder.encode(&request.clone().destination(35).priority(3)).unwrap();
    assert_eq!(addressed.id, CanId(0x0CEA2301));
    assert_eq!(addressed.id.destination(), 35);
}

#[test]
/// The sequence counter starts at 5, advances per Fast Packet and wraps.
fn test_encode_sequence_counter() {
    let mut encoder = Encoder::new(registry());
    let headers: Vec<u8> = (0..4)
        .map(|_| encoder.encode(&engine_message()).unwrap().frames[0].data[0])
        .collect();
    assert_eq!(headers, vec![0xA0, 0xC0, 0xE0, 0x00]);

    // Single-frame messages do not consume a sequence id.
    encoder
        .encode(&OutgoingMessage::for_pgn(59904).field("pgn", 60928u32))
        .unwrap();
    let next = encoder.encode(&engine_message()).unwrap();
    assert_eq!(next.frames[0].data[0], 0x20);
}

#[test]
/// Priority comes from the message, else from the schema.
fn test_encode_priority() {
    let mut encoder = Encoder::new(registry());
    assert_eq!(encoder.encode(&engine_message()).unwrap().id.priority(), 2);
    assert_eq!(encoder.encode(&engine_message().priority(9)).unwrap().id.priority(), 7);
}

#[test]
/// A decoded packet encodes back to the same payload.
fn test_encode_from_packet() {
    let registry = registry();
    let mut parser = Parser::new(Arc::clone(&registry));
    let frame = CanFrame::new(CanId(0x19F21123), FLUID_LEVEL);
    let packet = parser.parse(&frame).unwrap().into_packet().unwrap();

    let encoded = Encoder::new(registry)
        .encode(&OutgoingMessage::from_packet(&packet))
        .unwrap();
    assert_eq!(encoded.payload, FLUID_LEVEL);
    assert_eq!(encoded.id, packet.id);
}

#[test]
/// Encoding failures name their cause.
fn test_encode_errors() {
    let mut encoder = Encoder::new(registry());
    assert!(matches!(
        encoder.encode(&OutgoingMessage::for_id("noSuchMessage")),
        Err(EncodeError::UnknownMessage { .. })
    ));
    assert!(matches!(
        encoder.encode(&OutgoingMessage::default()),
        Err(EncodeError::MissingTarget)
    ));
    assert!(matches!(
        encoder.encode(&OutgoingMessage::for_pgn(127505).field("type", "Diesel")),
        Err(EncodeError::UnknownLabel { .. })
    ));
    assert!(matches!(
        encoder.encode(&OutgoingMessage::for_pgn(127505).field("level", "full")),
        Err(EncodeError::TypeMismatch { .. })
    ));
}
