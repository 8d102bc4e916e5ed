//! NMEA 2000 Fast Packet support: encapsulates payloads larger than eight bytes
//! across successive CAN frames.
//!
//! Byte 0 of every frame packs a 3-bit sequence id (high bits) and a 5-bit
//! frame index. Frame 0 then carries the total byte count and six payload
//! bytes; every following frame carries seven.

/// Maximum payload a Fast Packet can transport once reassembled.
pub const MAX_FAST_PACKET_PAYLOAD: usize = 223;
/// Frame indexes are five bits wide.
pub const MAX_FAST_PACKET_FRAMES: usize = 32;

pub mod assembler;
pub mod builder;

/// Frames needed for `total_bytes`: the length byte occupies one slot.
pub fn frames_for(total_bytes: usize) -> usize {
    (total_bytes + 1).div_ceil(7)
}

//==================================================================================FRAME_HEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Decoded Fast Packet header of one CAN frame.
pub struct FrameHeader<'a> {
    pub sequence_id: u8,
    pub frame_index: u8,
    /// Announced payload length, only present on frame 0.
    pub total_bytes: Option<usize>,
    /// Payload bytes carried by this frame (padding included).
    pub frame_data: &'a [u8],
}

impl<'a> FrameHeader<'a> {
    /// Split a raw frame; `None` when the frame holds no header byte.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let (&header, rest) = data.split_first()?;
        let frame_index = header & 0x1F;
        let sequence_id = header >> 5;
        if frame_index == 0 {
            let (total_bytes, frame_data) = match rest.split_first() {
                Some((&total, frame_data)) => (total as usize, frame_data),
                None => (0, rest),
            };
            Some(Self {
                sequence_id,
                frame_index,
                total_bytes: Some(total_bytes),
                frame_data,
            })
        } else {
            Some(Self {
                sequence_id,
                frame_index,
                total_bytes: None,
                frame_data: rest,
            })
        }
    }

    /// `ceil((total_bytes + 1) / 7)`, known from frame 0 only.
    pub fn total_frames(&self) -> Option<usize> {
        self.total_bytes.map(frames_for)
    }

    pub fn header_byte(sequence_id: u8, frame_index: u8) -> u8 {
        ((sequence_id & 0x07) << 5) | (frame_index & 0x1F)
    }
}
