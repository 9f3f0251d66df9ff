use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error is the error taxonomy surfaced by the PeerConnection engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// InvalidState: operation disallowed in the current signaling or
    /// connection state.
    #[error("operation not allowed in state {0}")]
    InvalidState(String),

    /// InvalidSdp: malformed or semantically incompatible SDP. Negotiation
    /// fails and signaling state is left unchanged.
    #[error("invalid sdp: {0}")]
    InvalidSdp(String),

    /// NoCodecNegotiated: the application asked to send on a kind with no
    /// agreed codec.
    #[error("no codec negotiated for this transceiver")]
    NoCodecNegotiated,

    /// UnknownTrack: `send_rtp` referenced a track the PeerConnection does
    /// not own.
    #[error("unknown track {0}")]
    UnknownTrack(String),

    /// TransportFailure: a non-recoverable ICE/DTLS/SCTP error occurred.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// ParseError: malformed RTP/RTCP/container input. Callers in the
    /// packet pipeline drop and log these; they are never fatal.
    #[error("parse error: {0}")]
    ParseError(String),

    /// ChecksumError: an Ogg page failed its CRC check.
    #[error("checksum error: {0}")]
    ChecksumError(String),

    #[error("{0}")]
    Sdp(#[from] sdp::Error),
    #[error("{0}")]
    Util(#[from] util::Error),

    #[error("{0}")]
    Other(String),
}
