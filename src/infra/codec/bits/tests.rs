use super::*;

/// Fluid level (127505): instance 3, water, level, capacity, reserved.
const FLUID_LEVEL: [u8; 8] = [0x13, 0x0D, 0x5E, 0xFC, 0x08, 0x00, 0x00, 0xFF];

//==================================================================================TEST_BITREADER
#[test]
/// Consecutive reads walk the fluid level fields, nibbles LSB first.
fn test_read_fluid_level_fields() {
    let mut reader = BitReader::new(&FLUID_LEVEL);
    assert_eq!(reader.read_u64(4).unwrap(), 3);
    assert_eq!(reader.read_u64(4).unwrap(), 1);
    assert_eq!(reader.read_u64(16).unwrap(), 0x5E0D);
    assert_eq!(reader.read_u64(32).unwrap(), 0x08FC);
    assert_eq!(reader.read_u64(8).unwrap(), 0xFF);
    assert_eq!(reader.bit_cursor(), 64);
}

#[test]
/// A 19-bit field followed by a 5-bit one, as in the AIS class B report.
fn test_read_odd_widths() {
    let data = [0xC0, 0x00, 0xC0];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_u64(19).unwrap(), 192);
    assert_eq!(reader.read_u64(5).unwrap(), 24);
}

#[test]
/// A 64-bit latitude read after a one-byte lead-in.
fn test_read_full_word() {
    let data = [0x23, 0x00, 0x4E, 0xA6, 0x10, 0xC4, 0x37, 0x68, 0x05];
    let mut reader = BitReader::at(&data, 8);
    assert_eq!(reader.read_u64(64).unwrap(), 389_622_683_000_000_000);
}

#[test]
/// Unaligned reads consume the buffer until it runs out.
fn test_read_until_exhausted() {
    let data = [0x00, 0x9D];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.read_u64(7).unwrap(), 0);
    assert_eq!(reader.read_u64(9).unwrap(), 0x13A);
    assert_eq!(
        reader.read_u64(2),
        Err(BitReaderError::OutOfBounds {
            asked: 2,
            available: 0
        })
    );
}

#[test]
/// Widths outside 1..=64 are rejected.
fn test_read_invalid_width() {
    let mut reader = BitReader::new(&FLUID_LEVEL);
    assert_eq!(
        reader.read_u64(0),
        Err(BitReaderError::TooLongForType { max: 64, asked: 0 })
    );
    assert_eq!(
        reader.read_u64(65),
        Err(BitReaderError::TooLongForType { max: 64, asked: 65 })
    );
}

#[test]
/// Seeking to the reserved byte; seeking past the end fails.
fn test_read_seek_cursor() {
    let mut reader = BitReader::new(&FLUID_LEVEL);
    assert!(reader.seek(56).is_ok());
    assert_eq!(reader.read_u64(8).unwrap(), 0xFF);
    assert_eq!(
        reader.seek(65),
        Err(BitReaderError::OutOfBounds {
            asked: 65,
            available: 64
        })
    );
}

#[test]
/// The free helper takes the in-byte fast path and the general path alike.
fn test_read_bits_helper() {
    // Vessel heading reference (2 bits) then 6 reserved bits.
    let data = [0xFD, 0x9D, 0x16];
    assert_eq!(read_bits(&data, 0, 2).unwrap(), 1);
    assert_eq!(read_bits(&data, 2, 6).unwrap(), 0x3F);
    assert_eq!(read_bits(&data, 8, 16).unwrap(), 5789);
    assert!(read_bits(&data, 20, 8).is_err());
}

#[test]
/// Aligned slices borrow the buffer; misaligned or oversized ones fail.
fn test_read_slice() {
    let mut reader = BitReader::at(&FLUID_LEVEL, 8);
    assert_eq!(reader.read_slice(2).unwrap(), &[0x0D, 0x5E]);
    assert_eq!(reader.bit_cursor(), 24);

    let mut reader = BitReader::new(&FLUID_LEVEL);
    assert_eq!(
        reader.read_slice(9).unwrap_err(),
        BitReaderError::OutOfBounds {
            asked: 9,
            available: 8
        }
    );

    let mut reader = BitReader::at(&FLUID_LEVEL, 4);
    assert_eq!(
        reader.read_slice(1).unwrap_err(),
        BitReaderError::NonAlignedBit { cursor: 4 }
    );
}

#[test]
/// Unaligned byte extraction shifts every byte by the cursor offset.
fn test_read_bytes_unaligned() {
    let mut reader = BitReader::at(&FLUID_LEVEL, 4);
    assert_eq!(reader.read_bytes(16).unwrap(), vec![0xD1, 0xE0]);
    let mut reader = BitReader::new(&FLUID_LEVEL);
    assert_eq!(reader.read_bytes(12).unwrap(), vec![0x13, 0x0D]);
}

//==================================================================================TEST_BITWRITER
#[test]
/// A 24-bit PGN number written at the start of an ISO request.
fn test_write_aligned_word() {
    let mut buffer = [0xFF; 3];
    let mut writer = BitWriter::new(&mut buffer);
    assert!(writer.write_u64(60928, 24).is_ok());
    assert_eq!(writer.bit_cursor(), 24);
    assert_eq!(buffer, [0x00, 0xEE, 0x00]);
}

#[test]
/// Two nibbles written one after the other share a byte.
fn test_write_nibbles() {
    let mut buffer = [0xFF; 2];
    let mut writer = BitWriter::new(&mut buffer);
    assert!(writer.write_u64(3, 4).is_ok());
    assert!(writer.write_u64(1, 4).is_ok());
    assert_eq!(buffer, [0x13, 0xFF]);
}

#[test]
/// A word across three bytes leaves the surrounding bits untouched.
fn test_write_straddling_word() {
    let mut buffer = [0xFF; 3];
    let mut writer = BitWriter::at(&mut buffer, 4);
    assert!(writer.write_u64(0x0CE0, 16).is_ok());
    assert_eq!(buffer, [0x0F, 0xCE, 0xF0]);
}

#[test]
/// Writing past the end fails and reports the room left.
fn test_write_out_of_bounds() {
    let mut buffer = [0x00; 8];
    let mut writer = BitWriter::at(&mut buffer, 56);
    assert_eq!(
        writer.write_u64(0x7FFF, 16),
        Err(BitWriterError::OutOfBounds {
            asked: 16,
            available: 8
        })
    );
    assert_eq!(buffer, [0x00; 8]);
}

#[test]
/// A 64-bit value between two untouched bytes.
fn test_write_full_word() {
    let mut buffer = [0xFF; 10];
    let mut writer = BitWriter::at(&mut buffer, 8);
    assert!(writer.write_u64(389_622_683_000_000_000, 64).is_ok());
    assert_eq!(
        buffer,
        [0xFF, 0x00, 0x4E, 0xA6, 0x10, 0xC4, 0x37, 0x68, 0x05, 0xFF]
    );
}

#[test]
/// Single-bit flags, as the AIS RAIM bit.
fn test_write_single_bit() {
    let mut buffer = [0x00; 2];
    assert!(write_bits(&mut buffer, 9, 1, 1).is_ok());
    assert_eq!(buffer, [0x00, 0x02]);
    assert!(write_bits(&mut buffer, 9, 0, 1).is_ok());
    assert_eq!(buffer, [0x00, 0x00]);
}

#[test]
/// An empty buffer has no room at all.
fn test_write_empty_buffer() {
    let mut buffer = [];
    let mut writer = BitWriter::new(&mut buffer);
    assert_eq!(
        writer.write_u64(0xFF, 8),
        Err(BitWriterError::OutOfBounds {
            asked: 8,
            available: 0
        })
    );
}

#[test]
/// Slices copy at byte boundaries only.
fn test_write_slice() {
    let mut buffer = [0x00; 8];
    let mut writer = BitWriter::new(&mut buffer);
    assert!(writer.write_slice(&FLUID_LEVEL[..5]).is_ok());
    assert_eq!(writer.bit_cursor(), 40);
    assert_eq!(buffer, [0x13, 0x0D, 0x5E, 0xFC, 0x08, 0x00, 0x00, 0x00]);

    let mut buffer = [0x00; 4];
    let mut writer = BitWriter::new(&mut buffer);
    assert_eq!(
        writer.write_slice(&FLUID_LEVEL[..5]).unwrap_err(),
        BitWriterError::OutOfBounds {
            asked: 5,
            available: 4
        }
    );

    let mut buffer = [0x00; 8];
    let mut writer = BitWriter::at(&mut buffer, 4);
    assert_eq!(
        writer.write_slice(&FLUID_LEVEL[..1]).unwrap_err(),
        BitWriterError::NonAlignedBit { cursor: 4 }
    );
}

#[test]
/// Unaligned byte writes mirror `read_bytes`; short sources are padded with ones.
fn test_write_bytes_unaligned() {
    let mut buffer = [0x00; 3];
    let mut writer = BitWriter::at(&mut buffer, 4);
    assert!(writer.write_bytes(&[0xD1, 0xE0], 16).is_ok());
    assert_eq!(buffer, [0x10, 0x0D, 0x0E]);

    let mut buffer = [0x00; 2];
    let mut writer = BitWriter::new(&mut buffer);
    assert!(writer.write_bytes(&[0x12], 12).is_ok());
    assert_eq!(buffer, [0x12, 0x0F]);
}
