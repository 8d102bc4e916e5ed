//! Unit tests for the `CanId` accessors and builder.
use super::*;

//==================================================================================CAN_ID
#[test]
/// Extracts the source address from the raw ID.
fn test_source_address() {
    let can_id = CanId(0x18EEFF01);
    assert_eq!(can_id.source_address(), 0x01);
}

#[test]
/// Verifies extraction of the 3-bit priority field.
fn test_priority() {
    assert_eq!(CanId(0x18EEFF01).priority(), 6);
    assert_eq!(CanId(0x0CF004EE).priority(), 3);
    assert_eq!(CanId(0x09F8017F).priority(), 2);
    assert_eq!(CanId(0x1CFF0042).priority(), 7);
}

#[test]
/// PDU1 identifiers keep PS as destination, PDU2 fold it into the PGN.
fn test_pgn() {
    assert_eq!(CanId(0x18EEFF01).pgn(), 60928);
    assert_eq!(CanId(0x0CF004EE).pgn(), 0xF004);
    assert_eq!(CanId(418022204).pgn(), 59904);
    assert_eq!(CanId(0x09F8017F).pgn(), 129025);
    assert_eq!(CanId(0x0DF8057F).pgn(), 129029);
    assert_eq!(CanId(0x19F51323).pgn(), 128275);
    assert_eq!(CanId(0x19F01442).pgn(), 126996);
    assert_eq!(CanId(0x1CFF0042).pgn(), 65280);
}

#[test]
/// Destination is PS for PDU1 and global for PDU2.
fn test_destination() {
    assert_eq!(CanId(0x18EEFF01).destination(), 255);
    assert_eq!(CanId(418022204).destination(), 131);
    assert_eq!(CanId(418022204).source_address(), 60);
    assert_eq!(CanId(0x18EA2301).destination(), 35);
    assert_eq!(CanId(0x0CF004EE).destination(), 0xFF);
}

#[test]
/// `parts` bundles every accessor.
fn test_parts() {
    let parts = CanId(0x18EAFF00).parts();
    assert_eq!(
        parts,
        CanIdParts {
            priority: 6,
            pgn: 59904,
            source: 0,
            destination: 255,
        }
    );
}

#[test]
/// Encoding an addressed PGN places the destination in PS.
fn test_encode_addressed() {
    let parts = CanIdParts {
        priority: 6,
        pgn: 61184,
        source: 50,
        destination: 220,
    };
    assert_eq!(CanId::encode(&parts), CanId(0x18EFDC32));
    assert_eq!(CanId(0x18EFDC32).parts(), parts);
}

#[test]
/// Encoding a broadcast PGN ignores the destination.
fn test_encode_broadcast_ignores_destination() {
    let parts = CanIdParts {
        priority: 7,
        pgn: 65280,
        source: 0x42,
        destination: 250,
    };
    assert_eq!(CanId::encode(&parts), CanId(0x1CFF0042));
}

#[test]
/// Parse then encode gives back the original identifier.
fn test_parse_encode_identity() {
    for raw in [
        0x18EEFF01u32,
        0x0CF004EE,
        418022204,
        0x18EA2301,
        0x09F8017F,
        0x0DF8057F,
        0x19F51323,
        0x18EAFF00,
        0x19F01442,
        0x1CFF0042,
    ] {
        let id = CanId(raw);
        assert_eq!(CanId::from(id.parts()), id, "identifier {raw:08X}");
    }
}

#[test]
/// Every priority, source and destination survives encode then decode.
fn test_encode_decode_all_addresses() {
    for priority in 0..=7u8 {
        for source in 0..=255u8 {
            for destination in 0..=255u8 {
                // ISO request, PDU1: the destination is kept.
                let addressed = CanIdParts {
                    priority,
                    pgn: 59904,
                    source,
                    destination,
                };
                assert_eq!(CanId::decode(CanId::encode(&addressed).0), addressed);

                // GNSS position, PDU2: the destination reads back as global.
                let broadcast = CanIdParts {
                    pgn: 129029,
                    ..addressed
                };
                let decoded = CanId::decode(CanId::encode(&broadcast).0);
                assert_eq!(
                    decoded,
                    CanIdParts {
                        destination: 0xFF,
                        ..broadcast
                    }
                );
            }
        }
    }
}
//==================================================================================CAN_ID_BUILDER
#[test]
/// Validates builder scenarios: broadcast and addressed.
fn test_builder() {
    // Broadcast, PGN 129029 (GNSS Position)
    let position_id = CanId::builder(129029, 0x7F).with_priority(3).build();
    assert_eq!(position_id, CanId(0x0DF8057F));

    // Addressed, PGN 59904 (ISO Request)
    let request_id = CanId::builder(59904, 60)
        .with_priority(6)
        .to_destination(131)
        .build();
    assert_eq!(request_id, CanId(418022204));

    // Destination supplied for a PDU2 PGN is dropped.
    let dropped = CanId::builder(129029, 0x7F)
        .with_priority(3)
        .to_destination(80)
        .build();
    assert_eq!(dropped, position_id);
}

#[test]
/// The priority must be capped to 3 bits to avoid touching the reserved field.
fn test_priority_clamped() {
    let can_id = CanId::builder(129029, 35).with_priority(0b1111_0000).build();

    assert_eq!(can_id.0 & (1 << 25), 0, "Reserved bit 25 must remain clear");
    assert_eq!(can_id.0 >> 29, 0);
    assert_eq!(can_id.priority(), 7);
}

#[test]
/// Builder defaults to priority 6 and a global destination.
fn test_builder_defaults() {
    let id = CanIdBuilder::new(59904, 0).build();
    assert_eq!(id, CanId(0x18EAFF00));
}

#[test]
/// PF/PS/DP accessors expose the raw identifier bytes.
fn test_raw_accessors() {
    let id = CanId(0x19F51323);
    assert_eq!(id.data_page(), 1);
    assert_eq!(id.pdu_format(), 0xF5);
    assert_eq!(id.pdu_specific(), 0x13);
    assert_eq!(id.source(), 0x23);
}

#[test]
/// Hex strings parse with or without prefix and display as 8 uppercase digits.
fn test_from_str_and_display() {
    let id: CanId = "0x18eeff01".parse().unwrap();
    assert_eq!(id, CanId(0x18EEFF01));
    assert_eq!("09F8017F".parse::<CanId>().unwrap(), CanId(0x09F8017F));
    assert!("not hex".parse::<CanId>().is_err());
    assert_eq!(CanId(0x0CF004EE).to_string(), "0CF004EE");
}

#[test]
/// `decode` ignores bits above the 29-bit identifier.
fn test_decode_masks_high_bits() {
    assert_eq!(CanId::decode(0x8000_0000 | 0x18EEFF01), CanId(0x18EEFF01).parts());
}
