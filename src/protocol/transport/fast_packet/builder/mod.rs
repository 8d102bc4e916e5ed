//! CAN frame generator for Fast Packet messages. Builds the frame sequence
//! (single or multi-packet) from an application payload.
use super::{frames_for, FrameHeader, MAX_FAST_PACKET_PAYLOAD};
use crate::conf::CAN_FRAME_PAYLOAD;
use crate::error::FragmentError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

/// Padding of the unused tail of the last frame.
const FILLER: u8 = 0xFF;

/// Split `payload` into Fast Packet frames tagged with `sequence_id`.
///
/// Frame 0 carries the header, the payload length and six bytes; each
/// following frame the header and seven bytes. Exactly
/// `ceil((len + 1) / 7)` frames are produced.
pub fn fragment(payload: &[u8], sequence_id: u8) -> Result<Vec<[u8; 8]>, FragmentError> {
    if payload.len() > MAX_FAST_PACKET_PAYLOAD {
        return Err(FragmentError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_FAST_PACKET_PAYLOAD,
        });
    }

    let total_frames = frames_for(payload.len());
    let mut frames = Vec::with_capacity(total_frames);
    let mut offset = 0;

    for frame_index in 0..total_frames {
        let mut data = [FILLER; CAN_FRAME_PAYLOAD];
        data[0] = FrameHeader::header_byte(sequence_id, frame_index as u8);
        let body = if frame_index == 0 {
            // Byte 1: total useful payload length.
            data[1] = payload.len() as u8;
            &mut data[2..]
        } else {
            &mut data[1..]
        };
        let take = body.len().min(payload.len() - offset);
        body[..take].copy_from_slice(&payload[offset..offset + take]);
        offset += take;
        frames.push(data);
    }
    Ok(frames)
}

//==================================================================================BUILDER
#[derive(Debug)]
/// Shared parameters for all frames composing one message.
pub struct FastPacketBuilder<'a> {
    id: CanId,
    payload: &'a [u8],
    sequence_id: u8,
    single_frame: bool,
}

/// Iterator returning the frames of a message one by one.
#[derive(Debug)]
pub struct FrameIterator {
    id: CanId,
    frames: std::vec::IntoIter<Vec<u8>>,
}

impl Iterator for FrameIterator {
    type Item = CanFrame;

    fn next(&mut self) -> Option<Self::Item> {
        self.frames.next().map(|data| CanFrame::new(self.id, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

impl ExactSizeIterator for FrameIterator {}

impl<'a> FastPacketBuilder<'a> {
    /// Fast Packet builder for `payload`, sequence id 0.
    pub fn new(id: CanId, payload: &'a [u8]) -> Self {
        Self {
            id,
            payload,
            sequence_id: 0,
            single_frame: false,
        }
    }

    /// Override the 3-bit Fast Packet sequence identifier.
    pub fn with_sequence_id(mut self, sequence_id: u8) -> Self {
        self.sequence_id = sequence_id & 0x07;
        self
    }

    /// Emit a single raw frame when the payload fits in one CAN frame.
    pub fn single_frame(mut self, single_frame: bool) -> Self {
        self.single_frame = single_frame;
        self
    }

    /// Validate the payload and start the iteration.
    pub fn build(self) -> Result<FrameIterator, FragmentError> {
        let frames = if self.single_frame && self.payload.len() <= CAN_FRAME_PAYLOAD {
            vec![self.payload.to_vec()]
        } else {
            fragment(self.payload, self.sequence_id)?
                .into_iter()
                .map(Vec::from)
                .collect()
        };
        Ok(FrameIterator {
            id: self.id,
            frames: frames.into_iter(),
        })
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
