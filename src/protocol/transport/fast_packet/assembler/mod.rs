//! NMEA 2000 Fast Packet reassembler: rebuilds application messages by
//! aggregating the CAN frames of a multi-packet sequence.
//!
//! Frames are stored by index whatever their arrival order. A sequence is
//! complete once it has received as many frames as frame 0 announced.
use super::{FrameHeader, MAX_FAST_PACKET_FRAMES};
use crate::error::ReassemblyError;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

//==================================================================================Enums and Structs
/// Outcome of feeding one frame to the reassembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reassembly {
    /// Frame stored; the sequence still misses fragments.
    Pending(SequenceState),
    /// All expected fragments were received.
    Complete(CompletedMessage),
}

/// A reassembled payload and the sequence it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMessage {
    pub identifier: u32,
    pub sequence_id: u8,
    pub total_frames: usize,
    /// Exactly the announced number of bytes.
    pub payload: Vec<u8>,
}

/// Progress of one `(identifier, sequence_id)` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceState {
    pub sequence_id: u8,
    /// Frame payloads indexed by frame index; `None` until received.
    pub frames: Vec<Option<Vec<u8>>>,
    /// Frames received so far, duplicates included.
    pub frame_count: usize,
    /// Unknown until frame 0 arrives.
    pub total_bytes: Option<usize>,
    pub total_frames: Option<usize>,
}

impl SequenceState {
    fn new(sequence_id: u8) -> Self {
        Self {
            sequence_id,
            frames: Vec::new(),
            frame_count: 0,
            total_bytes: None,
            total_frames: None,
        }
    }

    fn record(&mut self, header: &FrameHeader<'_>) {
        if let Some(total_bytes) = header.total_bytes {
            self.total_bytes = Some(total_bytes);
            self.total_frames = header.total_frames();
        }
        let index = header.frame_index as usize;
        if self.frames.len() <= index {
            self.frames.resize(index + 1, None);
        }
        self.frames[index] = Some(header.frame_data.to_vec());
        self.frame_count += 1;
    }

    /// Whether every announced frame has been received.
    pub fn is_complete(&self) -> bool {
        self.total_frames == Some(self.frame_count)
    }

    fn into_message(self, identifier: u32) -> CompletedMessage {
        let total_bytes = self.total_bytes.unwrap_or(0);
        let total_frames = self.total_frames.unwrap_or(0);
        let mut payload = Vec::with_capacity(total_frames * 7);

        for index in 0..total_frames {
            match self.frames.get(index).and_then(Option::as_ref) {
                Some(bytes) => payload.extend_from_slice(bytes),
                None => {
                    // A duplicate filled the count in place of this frame.
                    warn!(
                        identifier = format_args!("{identifier:#010X}"),
                        sequence_id = self.sequence_id,
                        frame_index = index,
                        "Fast Packet frame missing at completion"
                    );
                    let width = if index == 0 { 6 } else { 7 };
                    payload.resize(payload.len() + width, 0xFF);
                }
            }
        }
        payload.truncate(total_bytes);
        payload.resize(total_bytes, 0);

        CompletedMessage {
            identifier,
            sequence_id: self.sequence_id,
            total_frames,
            payload,
        }
    }
}

//==================================================================================REASSEMBLER
/// Owns the state of every in-flight sequence, keyed by CAN identifier then
/// sequence id. One instance per stream; not meant to be shared.
#[derive(Debug, Default)]
pub struct Reassembler {
    sequences: HashMap<u32, HashMap<u8, SequenceState>>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    //==================================================================================Process Functions
    /// Feed one frame of a Fast Packet message.
    ///
    /// * `identifier` – full CAN identifier of the frame
    /// * `data` – raw frame payload (header byte first)
    ///
    /// When more frames arrive than announced (typically a lost frame 0),
    /// every sequence of `identifier` is discarded and an overrun is returned.
    pub fn process(&mut self, identifier: u32, data: &[u8]) -> Result<Reassembly, ReassemblyError> {
        let header = FrameHeader::parse(data).ok_or(ReassemblyError::EmptyFrame { identifier })?;
        let sequence_id = header.sequence_id;

        let sequences = self.sequences.entry(identifier).or_default();
        let mut state = sequences
            .remove(&sequence_id)
            .unwrap_or_else(|| SequenceState::new(sequence_id));
        state.record(&header);
        trace!(
            identifier = format_args!("{identifier:#010X}"),
            sequence_id,
            frame_index = header.frame_index,
            frame_count = state.frame_count,
            "Fast Packet frame stored"
        );

        if state.is_complete() {
            if sequences.is_empty() {
                self.sequences.remove(&identifier);
            }
            let message = state.into_message(identifier);
            debug!(
                identifier = format_args!("{identifier:#010X}"),
                sequence_id,
                len = message.payload.len(),
                "Fast Packet complete"
            );
            return Ok(Reassembly::Complete(message));
        }

        let limit = state.total_frames.unwrap_or(MAX_FAST_PACKET_FRAMES);
        if state.frame_count > limit {
            self.sequences.remove(&identifier);
            warn!(
                identifier = format_args!("{identifier:#010X}"),
                sequence_id,
                frame_count = state.frame_count,
                total_frames = limit,
                "Fast Packet overrun, state cleared"
            );
            return Err(ReassemblyError::Overrun {
                identifier,
                sequence_id,
                frame_count: state.frame_count,
                total_frames: limit,
            });
        }

        let snapshot = state.clone();
        sequences.insert(sequence_id, state);
        Ok(Reassembly::Pending(snapshot))
    }

    /// Pending state of a sequence, if any.
    pub fn state(&self, identifier: u32, sequence_id: u8) -> Option<&SequenceState> {
        self.sequences.get(&identifier)?.get(&sequence_id)
    }

    /// Drop every pending sequence.
    pub fn clear(&mut self) {
        self.sequences.clear();
    }

    /// Number of identifiers with at least one pending sequence.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
