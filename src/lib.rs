//! `korri-codec` library: schema-driven encoding and decoding of NMEA 2000
//! messages. The crate normalizes a CANboat-style catalog into message
//! schemas, extracts and injects bit-level fields, and handles the
//! 29-bit CAN identifier and Fast Packet transport.
//==================================================================================
/// Configuration constants and the runtime `CodecConfig`.
pub mod conf;
/// Data contract shared by the schema normalizer and the field engine.
pub mod core;
/// Catalog, transport and encoding errors.
pub mod error;
/// Bit-level codec primitives: bit reader/writer, numeric and text codecs,
/// schema-driven field engine.
pub mod infra;
/// NMEA 2000 protocol implementation: CAN transport, Fast Packet,
/// message schemas and the high-level parser/encoder.
pub mod protocol;
//==================================================================================
pub use crate::core::{FieldKind, FieldMap, FieldSchema, FieldValue, MessageSchema, SchemaEntry};
pub use crate::protocol::messages::{Encoder, OutgoingMessage, Packet, Parsed, Parser};
pub use crate::protocol::schema::SchemaRegistry;
