//! Error definitions shared across library modules.
//! Each type models one failure domain: catalog loading, Fast Packet
//! transport, bit-level access and message encoding.
use crate::core::FieldValue;
use std::path::PathBuf;
use thiserror::Error;

//==================================================================================CATALOG
#[derive(Debug, Error)]
/// Failures while loading a PGN catalog or a codec configuration.
pub enum CatalogError {
    /// The document is not valid JSON or does not match the catalog layout.
    #[error("Invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//==================================================================================FAST_PACKET
#[derive(Debug, Error, PartialEq, Eq)]
/// Fast Packet reassembly failures. All of them are recoverable: the
/// offending frame is dropped and the parser keeps going.
pub enum ReassemblyError {
    /// A frame without any byte cannot carry a Fast Packet header.
    #[error("Empty Fast Packet frame on CAN id {identifier:#010X}")]
    EmptyFrame { identifier: u32 },
    /// More frames arrived for a sequence than its first frame announced.
    /// Every pending sequence of the identifier has been discarded.
    #[error(
        "Fast Packet overrun on CAN id {identifier:#010X} sequence {sequence_id}: \
         {frame_count} frames received, {total_frames} expected"
    )]
    Overrun {
        identifier: u32,
        sequence_id: u8,
        frame_count: usize,
        total_frames: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Failures while splitting a payload into Fast Packet frames.
pub enum FragmentError {
    /// The first frame length byte caps the payload.
    #[error("Payload of {len} bytes exceeds the Fast Packet limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },
}

//==================================================================================BITREADER
#[derive(Debug, Error, PartialEq, Eq)]
/// Low-level errors raised by `BitReader`.
pub enum BitReaderError {
    /// Requested length exceeds the remaining bits in the buffer.
    #[error("Out of bounds: asked {asked}, available {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Requested bit length exceeds the target integer width.
    #[error("Too long for type: max {max}, asked {asked}")]
    TooLongForType { max: u32, asked: u32 },
    /// Slice access attempted with a cursor not aligned on a byte boundary.
    #[error("Non-aligned bit cursor: {cursor}")]
    NonAlignedBit { cursor: usize },
}

//==================================================================================BITWRITER
#[derive(Debug, Error, PartialEq, Eq)]
/// Low-level errors raised by `BitWriter`.
pub enum BitWriterError {
    /// Requested length exceeds the remaining bits in the buffer.
    #[error("Out of bounds: asked {asked}, available {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Requested bit length exceeds the source integer width.
    #[error("Too long for type: max {max}, asked {asked}")]
    TooLongForType { max: u32, asked: u32 },
    /// Slice write attempted with a cursor not aligned on a byte boundary.
    #[error("Non-aligned bit cursor: {cursor}")]
    NonAlignedBit { cursor: usize },
}

//==================================================================================ENCODE
#[derive(Debug, Error)]
/// Failures while turning application values into a payload or frames.
pub enum EncodeError {
    /// The value cannot be represented by the field kind (text for a number, etc.).
    #[error("Field `{field}` cannot encode value {value:?}")]
    TypeMismatch { field: String, value: FieldValue },
    /// A lookup label has no numeric counterpart in the field's table.
    #[error("Field `{field}` has no lookup entry named `{label}`")]
    UnknownLabel { field: String, label: String },
    /// No schema carries the requested catalog id.
    #[error("Unknown message id `{id}`")]
    UnknownMessage { id: String },
    /// Neither a PGN nor a catalog id was supplied.
    #[error("Outgoing message names neither a PGN nor a message id")]
    MissingTarget,
    /// Writing the field would overflow the payload buffer.
    #[error("Field `{field}` does not fit the payload: {source}")]
    Write {
        field: String,
        #[source]
        source: BitWriterError,
    },
    /// The payload could not be split into frames.
    #[error(transparent)]
    Fragment(#[from] FragmentError),
}
