//! In-memory representation of an SAE J1939 / NMEA 2000 CAN frame.
use crate::conf::CAN_FRAME_PAYLOAD;
use crate::protocol::transport::can_id::CanId;
use embedded_can::{ExtendedId, Frame, Id};

#[derive(Clone, Debug, PartialEq, Eq)]
/// NMEA 2000 frame as read from the CAN bus, or a message already
/// reassembled upstream (`is_complete`).
pub struct CanFrame {
    /// Full 29-bit CAN identifier stored inside a `u32`.
    pub id: CanId,
    /// PGN carried by `id`, cached.
    pub pgn: u32,
    /// Payload. Eight bytes at most for a bus frame, up to 223 when complete.
    pub data: Vec<u8>,
    /// Set when `data` is a whole message and must bypass fast-packet
    /// reassembly.
    pub is_complete: bool,
    /// Capture timestamp, passed through untouched.
    pub timestamp: Option<String>,
}

impl CanFrame {
    pub fn new(id: CanId, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            pgn: id.pgn(),
            data: data.into(),
            is_complete: false,
            timestamp: None,
        }
    }

    /// Frame holding a whole message payload.
    pub fn complete(id: CanId, data: impl Into<Vec<u8>>) -> Self {
        Self {
            is_complete: true,
            ..Self::new(id, data)
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Number of payload bytes (DLC for bus frames).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

//==================================================================================EMBEDDED_CAN
impl Frame for CanFrame {
    /// Only extended data frames of at most eight bytes exist on NMEA 2000.
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Extended(ext) if data.len() <= CAN_FRAME_PAYLOAD => {
                Some(CanFrame::new(CanId(ext.as_raw()), data))
            }
            _ => None,
        }
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        true
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        Id::Extended(ExtendedId::new(self.id.0).unwrap_or(ExtendedId::ZERO))
    }

    fn dlc(&self) -> usize {
        self.data.len()
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
