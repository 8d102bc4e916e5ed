//! High-level components of the NMEA 2000 protocol: message schemas,
//! CAN/Fast Packet transport, and the parser/encoder pipeline.
pub mod messages;
pub mod schema;
pub mod transport;
