//! Values to frames: schema selection, payload injection, CAN id and
//! Fast Packet fragmentation.
use super::packet::Packet;
use crate::conf::GLOBAL_ADDRESS;
use crate::core::{FieldKind, FieldMap, FieldValue, MessageSchema, SchemaEntry};
use crate::error::EncodeError;
use crate::infra::codec::engine::{self, UNKNOWN_DATA_ID};
use crate::protocol::schema::SchemaRegistry;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::{CanId, CanIdParts};
use crate::protocol::transport::fast_packet::builder::FastPacketBuilder;
use std::sync::Arc;
use tracing::{debug, trace};

//==================================================================================OUTGOING
/// Message to encode, addressed either by PGN or by catalog id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub pgn: Option<u32>,
    /// Catalog id; takes precedence over `pgn`.
    pub message_id: Option<String>,
    /// Overrides the schema priority.
    pub priority: Option<u8>,
    pub source: u8,
    /// Ignored for broadcast PGNs; 0xFF when absent.
    pub destination: Option<u8>,
    pub fields: FieldMap,
}

impl OutgoingMessage {
    pub fn for_pgn(pgn: u32) -> Self {
        Self {
            pgn: Some(pgn),
            ..Self::default()
        }
    }

    pub fn for_id(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            ..Self::default()
        }
    }

    /// Values of a decoded packet, ready to be encoded again.
    pub fn from_packet(packet: &Packet) -> Self {
        let mut fields = packet.fields();
        fields.remove(UNKNOWN_DATA_ID);
        Self {
            pgn: Some(packet.pgn),
            message_id: None,
            priority: Some(packet.priority()),
            source: packet.source(),
            destination: Some(packet.destination()),
            fields,
        }
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn source(mut self, source: u8) -> Self {
        self.source = source;
        self
    }

    pub fn destination(mut self, destination: u8) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn field(mut self, id: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(id.into(), value.into());
        self
    }
}

/// Encoded payload with its identifier and the frames to put on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMessage {
    pub id: CanId,
    pub payload: Vec<u8>,
    pub schema: Arc<MessageSchema>,
    pub frames: Vec<CanFrame>,
}

//==================================================================================ENCODER
/// Stateful encoder: owns the Fast Packet sequence counter of one sender.
#[derive(Debug)]
pub struct Encoder {
    registry: Arc<SchemaRegistry>,
    sequence_id: u8,
}

/// Supplied value of a match field as an integer, lookup labels translated.
fn supplied_match(schema: &MessageSchema, index: usize, fields: &FieldMap) -> Option<i64> {
    let field = schema.fields.get(index)?;
    match (fields.get(&field.id)?, &field.kind) {
        (FieldValue::Text(label), FieldKind::Lookup(table)) => {
            table.value_of(label).and_then(|v| i64::try_from(v).ok())
        }
        (value, _) => value.as_i64(),
    }
}

/// Option whose match fields are all supplied with their expected value,
/// the group fallback otherwise.
fn select(entry: &SchemaEntry, fields: &FieldMap) -> Arc<MessageSchema> {
    match entry {
        SchemaEntry::Single(schema) => Arc::clone(schema),
        SchemaEntry::Options(group) => group
            .options
            .iter()
            .find(|option| {
                option
                    .match_fields
                    .iter()
                    .all(|m| supplied_match(option, m.index, fields) == Some(m.expected))
            })
            .map(Arc::clone)
            .unwrap_or_else(|| {
                debug!(pgn = group.pgn, fallback = %group.fallback.id, "No option matches the values");
                Arc::clone(&group.fallback)
            }),
    }
}

impl Encoder {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let sequence_id = registry.config().first_sequence_id & 0x07;
        Self {
            registry,
            sequence_id,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn schema_for(&self, message: &OutgoingMessage) -> Result<Arc<MessageSchema>, EncodeError> {
        if let Some(id) = &message.message_id {
            return self
                .registry
                .find_by_id(id)
                .ok_or_else(|| EncodeError::UnknownMessage { id: id.clone() });
        }
        let pgn = message.pgn.ok_or(EncodeError::MissingTarget)?;
        Ok(select(&self.registry.lookup(pgn), &message.fields))
    }

    /// Build the payload, CAN id and frames of `message`.
    ///
    /// Each multi-frame message consumes one sequence id.
    pub fn encode(&mut self, message: &OutgoingMessage) -> Result<EncodedMessage, EncodeError> {
        let schema = self.schema_for(message)?;
        let payload = engine::inject(&schema, &message.fields)?;

        let destination = if schema.is_addressable() {
            message.destination.unwrap_or(GLOBAL_ADDRESS)
        } else {
            GLOBAL_ADDRESS
        };
        let id = CanId::encode(&CanIdParts {
            priority: message.priority.unwrap_or(schema.priority),
            pgn: schema.pgn,
            source: message.source,
            destination,
        });

        let frames: Vec<CanFrame> = FastPacketBuilder::new(id, &payload)
            .single_frame(schema.is_single_frame)
            .with_sequence_id(self.sequence_id)
            .build()?
            .collect();
        if !schema.is_single_frame {
            self.sequence_id = (self.sequence_id + 1) & 0x07;
        }

        trace!(pgn = schema.pgn, id = %schema.id, frames = frames.len(), "Message encoded");
        Ok(EncodedMessage {
            id,
            payload,
            schema,
            frames,
        })
    }
}
