//! Transport capability

use bytes::Bytes;

use mimic_core::{EntityId, MimicResult};

/// Delivery of one serialized envelope to the peers observing `entity`.
///
/// Implementations must not block the caller's frame. Queuing, retries and
/// backpressure are the implementation's business.
pub trait Transport {
    fn send(&mut self, entity: EntityId, frame: Bytes, reliable: bool) -> MimicResult<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, entity: EntityId, frame: Bytes, reliable: bool) -> MimicResult<()> {
        (**self).send(entity, frame, reliable)
    }
}

/// Transport that records every send, for tests and dry runs
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<SentFrame>,
}

/// One recorded send
#[derive(Clone, Debug, PartialEq)]
pub struct SentFrame {
    pub entity: EntityId,
    pub frame: Bytes,
    pub reliable: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        RecordingTransport::default()
    }

    /// Take everything recorded so far
    pub fn take(&mut self) -> Vec<SentFrame> {
        std::mem::take(&mut self.sent)
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, entity: EntityId, frame: Bytes, reliable: bool) -> MimicResult<()> {
        self.sent.push(SentFrame {
            entity,
            frame,
            reliable,
        });
        Ok(())
    }
}
