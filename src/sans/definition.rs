//! States processing definition records, and the table of active definitions.

use alloc::{sync::Arc, vec::Vec};

use thiserror::Error;
use zerocopy::FromBytes;

use super::header::RecordHeader;

/// State token to decode the fixed part of a definition record.
#[derive(Debug)]
pub struct Definition(pub(super) ());

#[repr(C, packed)]
#[derive(Debug, FromBytes)]
struct DefinitionMessage {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    fields_remaining: u8,
}

impl Definition {
    /// Transition to another state by decoding the fixed part of a definition
    /// record.
    ///
    /// Returns a successor state token, which knows how many field bytes
    /// follow.
    pub fn advance(self, r: [u8; 5]) -> DefinitionFields {
        let DefinitionMessage {
            architecture,
            global_message,
            fields_remaining,
            ..
        } = zerocopy::transmute!(r);

        DefinitionFields {
            architecture,
            global: u16::from_le_bytes(global_message),
            count: fields_remaining,
        }
    }
}

/// State token to decode the field list of a definition record.
#[derive(Debug)]
pub struct DefinitionFields {
    architecture: u8,
    global: u16,
    count: u8,
}

impl DefinitionFields {
    /// Number of field bytes expected by [`Self::advance`].
    pub fn len(&self) -> usize {
        self.count as usize * 3
    }

    /// Whether the definition declares no fields.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Transition to another state by decoding the field list of a definition
    /// record.
    ///
    /// Expects exactly [`Self::len`] bytes.
    ///
    /// Returns the completed definition, and a successor state token.
    pub fn advance(self, r: &[u8]) -> (MessageDefinition, RecordHeader) {
        debug_assert_eq!(r.len(), self.len());

        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct FieldHeader {
            field: u8,
            size: u8,
            base_type: u8,
        }

        let mut offset = 0;
        let fields = r
            .chunks_exact(3)
            .take(self.count as usize)
            .filter_map(|c| FieldHeader::read_from_bytes(c).ok())
            .map(|header| {
                let FieldHeader {
                    field,
                    size,
                    base_type,
                } = header;

                let definition = FieldDefinition {
                    field,
                    size,
                    offset,
                    base_type: BaseType::from(base_type),
                };
                offset += size as usize;

                definition
            })
            .collect();

        let definition = MessageDefinition {
            architecture: self.architecture,
            global: self.global,
            fields,
            size: offset,
        };

        (definition, RecordHeader(()))
    }
}

/// Base type of a field, as declared by its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    SInt8,
    UInt8,
    SInt16,
    UInt16,
    SInt32,
    UInt32,
    String,
    Float32,
    Float64,
    UInt8z,
    UInt16z,
    UInt32z,
    Byte,
    SInt64,
    UInt64,
    UInt64z,
    /// A type number this crate does not know.
    Unrecognized(u8),
}

impl From<u8> for BaseType {
    fn from(r: u8) -> Self {
        match r {
            0x00 => Self::Enum,
            0x01 => Self::SInt8,
            0x02 => Self::UInt8,
            0x83 => Self::SInt16,
            0x84 => Self::UInt16,
            0x85 => Self::SInt32,
            0x86 => Self::UInt32,
            0x07 => Self::String,
            0x88 => Self::Float32,
            0x89 => Self::Float64,
            0x0A => Self::UInt8z,
            0x8B => Self::UInt16z,
            0x8C => Self::UInt32z,
            0x0D => Self::Byte,
            0x8E => Self::SInt64,
            0x8F => Self::UInt64,
            0x90 => Self::UInt64z,
            r => Self::Unrecognized(r),
        }
    }
}

impl From<BaseType> for u8 {
    fn from(t: BaseType) -> Self {
        match t {
            BaseType::Enum => 0x00,
            BaseType::SInt8 => 0x01,
            BaseType::UInt8 => 0x02,
            BaseType::SInt16 => 0x83,
            BaseType::UInt16 => 0x84,
            BaseType::SInt32 => 0x85,
            BaseType::UInt32 => 0x86,
            BaseType::String => 0x07,
            BaseType::Float32 => 0x88,
            BaseType::Float64 => 0x89,
            BaseType::UInt8z => 0x0A,
            BaseType::UInt16z => 0x8B,
            BaseType::UInt32z => 0x8C,
            BaseType::Byte => 0x0D,
            BaseType::SInt64 => 0x8E,
            BaseType::UInt64 => 0x8F,
            BaseType::UInt64z => 0x90,
            BaseType::Unrecognized(r) => r,
        }
    }
}

/// A single field declared by a definition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field number, unique within its message.
    pub field: u8,
    /// Size of the field in bytes. Arrays span several elements.
    pub size: u8,
    /// Offset of the field from the start of a data record's payload.
    pub offset: usize,
    pub base_type: BaseType,
}

/// The shape of data records for one local message, as declared by a
/// definition record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    architecture: u8,
    global: u16,
    fields: Vec<FieldDefinition>,
    size: usize,
}

impl MessageDefinition {
    /// The global message number.
    pub fn global(&self) -> u16 {
        self.global
    }

    /// The declared architecture byte (zero for little-endian).
    ///
    /// Decoding always assumes little-endian data.
    pub fn architecture(&self) -> u8 {
        self.architecture
    }

    /// Fields in payload order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Find a field by number.
    pub fn field(&self, field: u8) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Payload size of data records using this definition.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Size of the definition record that declared this definition, excluding
    /// its record header.
    pub fn encoded_len(&self) -> usize {
        self.fields.len() * 3 + 5
    }
}

/// A data record referenced a local message with no definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No definition for local message {0}.")]
pub struct UndefinedLocalMessage(pub u8);

/// Active definitions, indexed by local message number.
#[derive(Debug, Default, Clone)]
pub struct DefinitionTable([Option<Arc<MessageDefinition>>; 16]);

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a definition active for a local message, returning the one it
    /// replaces.
    pub fn insert(
        &mut self,
        local: u8,
        definition: MessageDefinition,
    ) -> Option<Arc<MessageDefinition>> {
        self.0[(local & 0xF) as usize].replace(Arc::new(definition))
    }

    /// The active definition for a local message.
    pub fn get(&self, local: u8) -> Result<&Arc<MessageDefinition>, UndefinedLocalMessage> {
        self.0[(local & 0xF) as usize]
            .as_ref()
            .ok_or(UndefinedLocalMessage(local))
    }
}
