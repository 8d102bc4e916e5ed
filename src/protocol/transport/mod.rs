//! NMEA 2000 transport layer: CAN frame representation, 29-bit identifier
//! codec, and Fast Packet reassembly/fragmentation.
pub mod can_frame;
pub mod can_id;
pub mod fast_packet;
