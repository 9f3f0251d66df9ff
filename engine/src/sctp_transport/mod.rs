#[cfg(test)]
mod sctp_transport_test;

use bytes::Bytes;

use crate::Result;

/// Reliability describes how a data channel's stream was negotiated over
/// SCTP's partial reliability extension.
///
/// <https://www.rfc-editor.org/rfc/rfc8831#section-6.4>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    Reliable,
    MaxRetransmits(u16),
    MaxPacketLifetimeMs(u16),
}

impl Default for Reliability {
    fn default() -> Self {
        Reliability::Reliable
    }
}

/// Events the SCTP association pushes to the PeerConnection actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SctpEvent {
    /// A stream finished opening and is ready to carry application data.
    Opened(u16),
    /// A DATA chunk arrived on a stream, tagged with its payload protocol
    /// identifier.
    Rx(u16, u32, Bytes),
    /// A stream was closed, locally or by the peer.
    Closed(u16),
}

/// SctpAssociation is the contract the engine consumes from the external
/// SCTP collaborator; the association itself (congestion control, chunk
/// retransmission, the wire format) is out of scope for this crate.
///
/// <https://www.rfc-editor.org/rfc/rfc8831>
pub trait SctpAssociation: Send + Sync {
    fn open_stream(&self, sid: u16, reliability: Reliability, ordered: bool) -> Result<()>;
    fn send(&self, sid: u16, ppid: u32, bytes: Bytes) -> Result<()>;
    fn close_stream(&self, sid: u16) -> Result<()>;
}
