//! Frame to packet pipeline: schema lookup, Fast Packet reassembly when the
//! PGN needs it, then field extraction.
use super::packet::{Packet, SequenceInfo};
use crate::error::ReassemblyError;
use crate::protocol::schema::SchemaRegistry;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::fast_packet::assembler::{Reassembler, Reassembly, SequenceState};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{trace, warn};

/// Result of parsing one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Packet(Packet),
    /// The frame was stored; its Fast Packet sequence is not complete yet.
    Pending(SequenceState),
}

impl Parsed {
    pub fn packet(&self) -> Option<&Packet> {
        match self {
            Parsed::Packet(packet) => Some(packet),
            Parsed::Pending(_) => None,
        }
    }

    pub fn into_packet(self) -> Option<Packet> {
        match self {
            Parsed::Packet(packet) => Some(packet),
            Parsed::Pending(_) => None,
        }
    }
}

/// Stateful parser. Holds the reassembly state of one frame stream; use one
/// instance per stream.
#[derive(Debug)]
pub struct Parser {
    registry: Arc<SchemaRegistry>,
    reassembler: Reassembler,
}

impl Parser {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            reassembler: Reassembler::new(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// Parse one frame.
    ///
    /// Complete frames and single-frame PGNs are decoded directly. Other
    /// frames go through the reassembler and yield a packet once their
    /// sequence completes.
    pub fn parse(&mut self, frame: &CanFrame) -> Result<Parsed, ReassemblyError> {
        let entry = self.registry.lookup(frame.pgn);

        if frame.is_complete || entry.is_single_frame() {
            let mut packet = Packet::decode(frame.id, frame.data.clone(), &entry);
            packet.timestamp = frame.timestamp.clone();
            trace!(pgn = frame.pgn, id = %packet.schema.id, "Frame decoded");
            return Ok(Parsed::Packet(packet));
        }

        match self.reassembler.process(frame.id.0, &frame.data)? {
            Reassembly::Pending(state) => Ok(Parsed::Pending(state)),
            Reassembly::Complete(message) => {
                let mut packet = Packet::decode(frame.id, message.payload, &entry);
                packet.sequence = Some(SequenceInfo {
                    sequence_id: message.sequence_id,
                    total_frames: message.total_frames,
                });
                packet.timestamp = frame.timestamp.clone();
                trace!(pgn = frame.pgn, id = %packet.schema.id, "Fast Packet decoded");
                Ok(Parsed::Packet(packet))
            }
        }
    }

    /// Parse a batch of frames.
    ///
    /// Returns single-frame packets in arrival order, followed by the last
    /// result of each Fast Packet sequence (complete packet or pending
    /// state), keyed by identifier and sequence id in first-seen order.
    /// Reassembly errors are logged and skipped.
    pub fn parse_batch(&mut self, frames: &[CanFrame]) -> Vec<Parsed> {
        let mut singles = Vec::new();
        let mut sequences: Vec<Parsed> = Vec::new();
        let mut index: HashMap<(u32, u8), usize> = HashMap::new();

        for frame in frames {
            let parsed = match self.parse(frame) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!(%error, "Frame skipped");
                    continue;
                }
            };
            let sequence_id = match &parsed {
                Parsed::Packet(packet) => packet.sequence.map(|s| s.sequence_id),
                Parsed::Pending(state) => Some(state.sequence_id),
            };
            match sequence_id {
                None => singles.push(parsed),
                Some(sequence_id) => match index.get(&(frame.id.0, sequence_id)) {
                    Some(&slot) => sequences[slot] = parsed,
                    None => {
                        index.insert((frame.id.0, sequence_id), sequences.len());
                        sequences.push(parsed);
                    }
                },
            }
        }

        singles.extend(sequences);
        singles
    }
}
