//! Dispatcher - serialize and hand off, nothing else

use mimic_core::MimicResult;
use mimic_wire::Envelope;

use crate::Transport;

/// Pass-through from encoded messages to the transport.
///
/// Holds no state besides the transport itself: no queue, no retries.
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Dispatcher { transport }
    }

    /// Serialize `envelope` and send it with its own reliability flag.
    /// Returns the number of bytes handed to the transport.
    pub fn dispatch(&mut self, envelope: &Envelope) -> MimicResult<usize> {
        let frame = envelope.serialize()?;
        let len = frame.len();
        self.transport
            .send(envelope.entity, frame, envelope.is_reliable())?;
        Ok(len)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingTransport;
    use mimic_core::{EntityId, MimicError, StateChange, StateHash};

    #[test]
    fn test_dispatch_passes_through() {
        let mut dispatcher = Dispatcher::new(RecordingTransport::new());
        let envelope = Envelope::state(EntityId::new(3), StateChange::new(StateHash::new(8), 0.0))
            .with_reliable(true);

        let len = dispatcher.dispatch(&envelope).unwrap();

        let sent = dispatcher.transport_mut().take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].entity, EntityId::new(3));
        assert!(sent[0].reliable);
        assert_eq!(sent[0].frame.len(), len);
        assert_eq!(Envelope::parse(&sent[0].frame).unwrap(), envelope);
    }

    struct Down;

    impl Transport for Down {
        fn send(&mut self, _: EntityId, _: bytes::Bytes, _: bool) -> MimicResult<()> {
            Err(MimicError::TransportError("link down".into()))
        }
    }

    #[test]
    fn test_transport_error_surfaces() {
        let mut dispatcher = Dispatcher::new(Down);
        let envelope = Envelope::state(EntityId::new(3), StateChange::new(StateHash::new(8), 0.0));
        assert!(matches!(
            dispatcher.dispatch(&envelope),
            Err(MimicError::TransportError(_))
        ));
    }
}
