use crate::rtp_transceiver::RtpCodecType;

/// TrackLocal is an outgoing media track's identity, not its bytes. It is
/// shareable by reference across the senders that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLocal {
    id: String,
    stream_id: String,
    kind: RtpCodecType,
}

impl TrackLocal {
    pub fn new(id: impl Into<String>, stream_id: impl Into<String>, kind: RtpCodecType) -> Self {
        TrackLocal {
            id: id.into(),
            stream_id: stream_id.into(),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn kind(&self) -> RtpCodecType {
        self.kind
    }
}

/// TrackRemote is an inbound media track's identity, surfaced to the
/// application via `Event::Track` once a receiver observes its first SSRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRemote {
    id: String,
    stream_id: String,
    kind: RtpCodecType,
    rid: Option<String>,
}

impl TrackRemote {
    pub fn new(
        id: impl Into<String>,
        stream_id: impl Into<String>,
        kind: RtpCodecType,
        rid: Option<String>,
    ) -> Self {
        TrackRemote {
            id: id.into(),
            stream_id: stream_id.into(),
            kind,
            rid,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn kind(&self) -> RtpCodecType {
        self.kind
    }

    /// rid is the RFC 8852 RID extension value identifying which simulcast
    /// layer this track carries, when the receiver has simulcast enabled.
    pub fn rid(&self) -> Option<&str> {
        self.rid.as_deref()
    }
}
