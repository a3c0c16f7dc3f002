//! Fixed header for the mimic wire protocol
//!
//! Fixed header is 16 bytes:
//! - Byte 0: Version (4 bits) + reserved (4 bits)
//! - Byte 1: Flags
//! - Byte 2: Payload kind
//! - Byte 3: Reserved
//! - Bytes 4-11: Entity address (LE)
//! - Bytes 12-13: Payload length (LE)
//! - Bytes 14-15: Reserved

use mimic_core::{EntityId, MimicError, MimicResult, PayloadKind};

use crate::EnvelopeFlags;

/// Fixed header size in bytes
pub const HEADER_SIZE: usize = 16;

/// Current wire protocol version
pub const WIRE_VERSION: u8 = 0;

/// Fixed envelope header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeHeader {
    /// Wire protocol version (4 bits, 0-15)
    pub version: u8,
    /// Envelope flags
    pub flags: EnvelopeFlags,
    /// Payload kind
    pub kind: PayloadKind,
    /// Target entity
    pub entity: EntityId,
    /// Payload length in bytes
    pub payload_len: u16,
}

impl EnvelopeHeader {
    pub fn new(entity: EntityId, kind: PayloadKind) -> Self {
        EnvelopeHeader {
            version: WIRE_VERSION,
            flags: EnvelopeFlags::NONE,
            kind,
            entity,
            payload_len: 0,
        }
    }

    /// Parse header from bytes
    pub fn parse(buf: &[u8]) -> MimicResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(MimicError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        // Byte 0: Version
        let version = buf[0] >> 4;
        if version != WIRE_VERSION {
            return Err(MimicError::UnsupportedVersion(version));
        }

        // Byte 1: Flags
        let flags = EnvelopeFlags::new(buf[1]);

        // Byte 2: Payload kind
        let kind =
            PayloadKind::from_byte(buf[2]).ok_or(MimicError::UnknownPayloadKind(buf[2]))?;

        // Bytes 4-11: Entity
        let mut entity = [0u8; 8];
        entity.copy_from_slice(&buf[4..12]);
        let entity = EntityId::from_bytes(entity);

        // Bytes 12-13: Payload length
        let payload_len = u16::from_le_bytes([buf[12], buf[13]]);

        Ok(EnvelopeHeader {
            version,
            flags,
            kind,
            entity,
            payload_len,
        })
    }

    /// Serialize header into the first `HEADER_SIZE` bytes of `buf`
    pub fn serialize(&self, buf: &mut [u8]) -> MimicResult<()> {
        if buf.len() < HEADER_SIZE {
            return Err(MimicError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        buf[0] = self.version << 4;
        buf[1] = self.flags.0;
        buf[2] = self.kind.to_byte();
        buf[3] = 0;
        buf[4..12].copy_from_slice(&self.entity.to_bytes());
        buf[12..14].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[14] = 0;
        buf[15] = 0;

        Ok(())
    }

    /// Serialize header to a fixed array
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = self.version << 4;
        buf[1] = self.flags.0;
        buf[2] = self.kind.to_byte();
        buf[4..12].copy_from_slice(&self.entity.to_bytes());
        buf[12..14].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = EnvelopeHeader {
            version: WIRE_VERSION,
            flags: EnvelopeFlags(EnvelopeFlags::RELIABLE),
            kind: PayloadKind::StateChange,
            entity: EntityId::new(0xDEADBEEF_CAFEBABE),
            payload_len: 8,
        };

        let bytes = header.to_bytes();
        let parsed = EnvelopeHeader::parse(&bytes).unwrap();
        assert_eq!(parsed, header);

        let mut buf = [0u8; HEADER_SIZE];
        header.serialize(&mut buf).unwrap();
        assert_eq!(buf, bytes);
    }

    #[test]
    fn test_header_too_short() {
        let buf = [0u8; 10];
        let result = EnvelopeHeader::parse(&buf);
        assert!(matches!(result, Err(MimicError::BufferTooShort { .. })));
    }

    #[test]
    fn test_header_unknown_kind() {
        let mut bytes = EnvelopeHeader::new(EntityId::new(1), PayloadKind::ParameterSnapshot)
            .to_bytes();
        bytes[2] = 0x7F;
        assert_eq!(
            EnvelopeHeader::parse(&bytes),
            Err(MimicError::UnknownPayloadKind(0x7F))
        );
    }

    #[test]
    fn test_header_unsupported_version() {
        let mut bytes = EnvelopeHeader::new(EntityId::new(1), PayloadKind::StateChange).to_bytes();
        bytes[0] = 0x30;
        assert_eq!(
            EnvelopeHeader::parse(&bytes),
            Err(MimicError::UnsupportedVersion(3))
        );
    }
}
