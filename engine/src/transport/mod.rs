#[cfg(test)]
mod transport_test;

use bytes::Bytes;

use crate::Result;

/// IceGatheringState mirrors the ICE agent's candidate-gathering progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IceGatheringState {
    #[default]
    New,
    Gathering,
    Complete,
}

/// IceConnectionState mirrors the ICE agent's connectivity-check progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IceConnectionState {
    #[default]
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

/// Events the ICE transport pushes to the PeerConnection actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IceEvent {
    GatheringStateChange(IceGatheringState),
    ConnectionStateChange(IceConnectionState),
    Data(Bytes),
    Candidate(String),
}

/// IceTransport is the contract the engine consumes from the external ICE
/// agent; candidate gathering and connectivity checks are out of scope for
/// this crate.
pub trait IceTransport: Send + Sync {
    fn add_remote_candidate(&self, candidate: &str) -> Result<()>;
    fn send(&self, bytes: &[u8]) -> Result<()>;
    fn restart_ice(&self) -> Result<()>;
    fn close(&self) -> Result<()>;
}

/// DtlsRole is the endpoint's role in the DTLS handshake, decided by the
/// SDP `a=setup` negotiation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DtlsRole {
    Client,
    Server,
}

/// DtlsTransportState mirrors the DTLS handshake's progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DtlsTransportState {
    #[default]
    New,
    Connecting,
    Connected,
    Closed,
    Failed,
}

/// Events the DTLS transport pushes to the PeerConnection actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DtlsEvent {
    StateChange(DtlsTransportState),
    Rx(Bytes),
    FingerprintReady(String),
}

/// DtlsTransport is the contract the engine consumes from the external DTLS
/// collaborator; the handshake and record layer are out of scope for this
/// crate.
pub trait DtlsTransport: Send + Sync {
    fn start(&self, role: DtlsRole) -> Result<()>;
    fn send(&self, bytes: &[u8]) -> Result<()>;
    fn close(&self) -> Result<()>;
}
