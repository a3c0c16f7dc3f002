//! UDP transport implementation
//!
//! `send` never blocks the frame loop: it queues each datagram for a
//! background task that owns the awaiting `send_to`. A full queue drops the
//! frame. Every frame goes to every registered peer; the entity address
//! travels inside the envelope.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use mimic_core::{EntityId, MimicError, MimicResult};
use mimic_wire::{Envelope, MAX_ENVELOPE_SIZE};

use crate::Transport;

/// Datagrams that may wait for the send task
pub const DEFAULT_SEND_QUEUE: usize = 1024;

/// UDP transport for mimic
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    peers: Vec<SocketAddr>,
    outgoing: PacketSender,
}

impl UdpTransport {
    /// Bind to a local address. Must be called inside a tokio runtime,
    /// which also hosts the send task.
    pub async fn bind(addr: SocketAddr) -> MimicResult<Self> {
        Self::bind_with_queue(addr, DEFAULT_SEND_QUEUE).await
    }

    /// Bind with a custom send queue depth
    pub async fn bind_with_queue(addr: SocketAddr, queue: usize) -> MimicResult<Self> {
        if queue == 0 {
            return Err(MimicError::InvalidConfig("send queue must not be empty".into()));
        }

        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| MimicError::TransportError(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| MimicError::TransportError(e.to_string()))?;

        let socket = Arc::new(socket);
        let outgoing = start_send_loop(Arc::clone(&socket), queue);

        Ok(UdpTransport {
            socket,
            local_addr,
            peers: Vec::new(),
            outgoing,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start sending to `peer`
    pub fn add_peer(&mut self, peer: SocketAddr) {
        if !self.peers.contains(&peer) {
            self.peers.push(peer);
        }
    }

    pub fn remove_peer(&mut self, peer: SocketAddr) {
        self.peers.retain(|p| *p != peer);
    }

    pub fn peers(&self) -> &[SocketAddr] {
        &self.peers
    }

    /// Receive and parse one envelope
    pub async fn recv_envelope(&self) -> MimicResult<(Envelope, SocketAddr)> {
        let (bytes, addr) = self.recv_bytes_from().await?;
        let envelope = Envelope::parse(&bytes)?;
        Ok((envelope, addr))
    }

    /// Receive raw bytes
    pub async fn recv_bytes_from(&self) -> MimicResult<(Vec<u8>, SocketAddr)> {
        let mut buf = vec![0u8; MAX_ENVELOPE_SIZE];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| MimicError::TransportError(e.to_string()))?;

        buf.truncate(len);
        Ok((buf, addr))
    }

    /// Get a clone of the socket for concurrent operations
    pub fn socket(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, entity: EntityId, frame: Bytes, reliable: bool) -> MimicResult<()> {
        if reliable {
            tracing::trace!(entity = %entity, "reliable delivery requested over plain UDP");
        }

        let mut first_error = None;
        for peer in &self.peers {
            if let Err(e) = self.outgoing.try_send((frame.clone(), *peer)) {
                let reason = match e {
                    TrySendError::Full(_) => "send queue full",
                    TrySendError::Closed(_) => "send task stopped",
                };
                tracing::debug!(entity = %entity, %peer, reason, "UDP send dropped");
                first_error.get_or_insert(MimicError::TransportError(format!("{peer}: {reason}")));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Packet receiver channel
pub type PacketReceiver = mpsc::Receiver<(Vec<u8>, SocketAddr)>;

/// Outgoing datagram queue
pub type PacketSender = mpsc::Sender<(Bytes, SocketAddr)>;

/// Start a background send loop. It stops once every sender is dropped.
pub fn start_send_loop(socket: Arc<UdpSocket>, buffer_size: usize) -> PacketSender {
    let (tx, mut rx) = mpsc::channel::<(Bytes, SocketAddr)>(buffer_size);

    tokio::spawn(async move {
        while let Some((frame, peer)) = rx.recv().await {
            if let Err(e) = socket.send_to(&frame, peer).await {
                tracing::warn!(%peer, error = %e, "UDP send error");
            }
        }
    });

    tx
}

/// Start a background receive loop
pub fn start_receive_loop(socket: Arc<UdpSocket>, buffer_size: usize) -> PacketReceiver {
    let (tx, rx) = mpsc::channel(buffer_size);

    tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_ENVELOPE_SIZE];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, addr)) => {
                    let packet = buf[..len].to_vec();
                    if tx.send((packet, addr)).await.is_err() {
                        break; // Receiver dropped
                    }
                }
                Err(e) => {
                    tracing::warn!("UDP receive error: {}", e);
                }
            }
        }
    });

    rx
}
