//! Complete envelope structure for the mimic wire protocol
//!
//! Envelope = Fixed Header + Payload

use bytes::{Bytes, BytesMut};

use mimic_core::{EntityId, MimicError, MimicResult, ParameterSnapshot, PayloadKind, StateChange};

use crate::{EnvelopeFlags, EnvelopeHeader, PayloadCodec, HEADER_SIZE};

/// Maximum envelope size (MTU-friendly)
pub const MAX_ENVELOPE_SIZE: usize = 1400;

/// Decoded payload
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Parameters(ParameterSnapshot),
    State(StateChange),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Parameters(_) => PayloadKind::ParameterSnapshot,
            Payload::State(_) => PayloadKind::StateChange,
        }
    }
}

/// One addressed unit handed to the transport
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Target entity
    pub entity: EntityId,
    /// Envelope flags
    pub flags: EnvelopeFlags,
    /// Payload
    pub payload: Payload,
}

impl Envelope {
    pub fn new(entity: EntityId, payload: Payload) -> Self {
        Envelope {
            entity,
            flags: EnvelopeFlags::NONE,
            payload,
        }
    }

    pub fn parameters(entity: EntityId, snapshot: ParameterSnapshot) -> Self {
        Self::new(entity, Payload::Parameters(snapshot))
    }

    pub fn state(entity: EntityId, change: StateChange) -> Self {
        Self::new(entity, Payload::State(change))
    }

    pub fn with_reliable(mut self, reliable: bool) -> Self {
        self.flags.set_reliable(reliable);
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.flags.set_refresh(refresh);
        self
    }

    #[inline]
    pub fn is_reliable(&self) -> bool {
        self.flags.is_reliable()
    }

    #[inline]
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Serialize to bytes
    pub fn serialize(&self) -> MimicResult<Bytes> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + 64);
        buf.resize(HEADER_SIZE, 0);

        match &self.payload {
            Payload::Parameters(snapshot) => PayloadCodec::encode_parameters(snapshot, &mut buf)?,
            Payload::State(change) => PayloadCodec::encode_state(change, &mut buf),
        }

        if buf.len() > MAX_ENVELOPE_SIZE {
            return Err(MimicError::EnvelopeTooLarge {
                size: buf.len(),
                max: MAX_ENVELOPE_SIZE,
            });
        }

        let payload_len = (buf.len() - HEADER_SIZE) as u16;
        let header = EnvelopeHeader {
            flags: self.flags,
            payload_len,
            ..EnvelopeHeader::new(self.entity, self.kind())
        };
        header.serialize(&mut buf[..HEADER_SIZE])?;

        Ok(buf.freeze())
    }

    /// Parse an envelope from bytes
    pub fn parse(buf: &[u8]) -> MimicResult<Self> {
        let header = EnvelopeHeader::parse(buf)?;

        let expected = HEADER_SIZE + header.payload_len as usize;
        if buf.len() != expected {
            return Err(MimicError::InvalidWireFormat(format!(
                "Payload length mismatch: header says {}, frame has {}",
                header.payload_len,
                buf.len() - HEADER_SIZE
            )));
        }

        let body = &buf[HEADER_SIZE..];
        let payload = match header.kind {
            PayloadKind::ParameterSnapshot => {
                Payload::Parameters(PayloadCodec::decode_parameters(body)?)
            }
            PayloadKind::StateChange => Payload::State(PayloadCodec::decode_state(body)?),
        };

        Ok(Envelope {
            entity: header.entity,
            flags: header.flags,
            payload,
        })
    }
}
