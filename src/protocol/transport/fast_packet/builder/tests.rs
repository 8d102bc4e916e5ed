//! Tests for the Fast Packet frame generator.
use super::*;

const GNSS_SATS: CanId = CanId(0x19FA0419);

#[test]
/// Short single-frame payload stays one classic CAN frame.
fn test_builder_single_frame() {
    let payload = [1, 2, 3, 4, 5];
    let mut iter = FastPacketBuilder::new(CanId(0x09F8012A), &payload)
        .single_frame(true)
        .build()
        .unwrap();

    let frame = iter.next().unwrap();
    assert_eq!(frame.data, payload);
    assert_eq!(frame.pgn, 129025);

    // Should be the only frame
    assert!(iter.next().is_none());
}

#[test]
/// Ten-byte payload split across two Fast Packet frames.
fn test_builder_two_frames() {
    // 10 bytes → 2 frames (6+4)
    let payload = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
    let frames: Vec<_> = FastPacketBuilder::new(GNSS_SATS, &payload)
        .with_sequence_id(0)
        .build()
        .unwrap()
        .collect();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].data, [0x00, 10, 1, 2, 3, 4, 5, 6]);
    assert_eq!(frames[1].data, [0x01, 7, 8, 9, 10, 0xFF, 0xFF, 0xFF]);
    assert!(frames.iter().all(|f| f.id == GNSS_SATS && !f.is_complete));
}

#[test]
/// A small payload of a multi-frame message is still fragmented.
fn test_small_fast_packet() {
    let payload = [0x11, 0x22];
    let frames: Vec<_> = FastPacketBuilder::new(GNSS_SATS, &payload)
        .with_sequence_id(5)
        .build()
        .unwrap()
        .collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].data, [0xA0, 2, 0x11, 0x22, 0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
/// The sequence id lands in the top three bits of every header.
fn test_sequence_id_header() {
    let payload = [0u8; 20];
    let frames = fragment(&payload, 6).unwrap();
    let headers: Vec<u8> = frames.iter().map(|f| f[0]).collect();
    assert_eq!(headers, vec![0xC0, 0xC1, 0xC2]);

    // Only three bits are kept.
    let frames = fragment(&payload, 0x0E).unwrap();
    assert_eq!(frames[0][0] >> 5, 6);
}

#[test]
/// Frame count is exactly ceil((n + 1) / 7), with no trailing filler frame.
fn test_frame_count() {
    for (len, expected) in [(0, 1), (6, 1), (7, 2), (13, 2), (14, 3), (43, 7), (223, 32)] {
        let payload = vec![0x5A; len];
        assert_eq!(fragment(&payload, 0).unwrap().len(), expected, "payload of {len}");
    }
}

#[test]
/// Maximum payload: 32 frames, the last one full.
fn test_builder_max_payload() {
    let payload = [0xAA; MAX_FAST_PACKET_PAYLOAD];
    let frames = fragment(&payload, 1).unwrap();
    assert_eq!(frames.len(), 32);
    assert_eq!(frames[0][1], 223);
    assert_eq!(frames[31][0], 0x3F);
    assert_eq!(frames[31][1..], [0xAA; 7]);
}

#[test]
/// Payloads above 223 bytes are rejected.
fn test_builder_payload_too_large() {
    let payload = [0u8; MAX_FAST_PACKET_PAYLOAD + 1];
    assert_eq!(
        fragment(&payload, 0),
        Err(FragmentError::PayloadTooLarge { len: 224, max: 223 })
    );
    assert!(FastPacketBuilder::new(GNSS_SATS, &payload).build().is_err());
}
