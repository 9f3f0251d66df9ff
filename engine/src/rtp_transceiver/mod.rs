
pub mod rtp_receiver;
pub mod rtp_sender;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

pub use rtp_receiver::RtpReceiver;
pub use rtp_sender::RtpSender;

/// PayloadType identifies the format of an RTP payload.
/// <https://tools.ietf.org/html/rfc3550#section-3>
pub type PayloadType = u8;

/// Ssrc is a synchronization source identifier.
pub type Ssrc = u32;

/// RTCPFeedback signals that a codec supports a given RTCP feedback mechanism.
/// <https://draft.ortc.org/#dom-rtcrtcpfeedback>
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RtcpFeedback {
    pub typ: String,
    pub parameter: String,
}

/// RtpCodecType distinguishes audio from video codecs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RtpCodecType {
    #[default]
    Unspecified,
    Audio,
    Video,
}

impl From<&str> for RtpCodecType {
    fn from(raw: &str) -> Self {
        match raw {
            "audio" => RtpCodecType::Audio,
            "video" => RtpCodecType::Video,
            _ => RtpCodecType::Unspecified,
        }
    }
}

impl fmt::Display for RtpCodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RtpCodecType::Audio => "audio",
            RtpCodecType::Video => "video",
            RtpCodecType::Unspecified => crate::UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// RtpCodecCapability describes one codec a transceiver may negotiate.
/// <https://w3c.github.io/webrtc-pc/#dictionary-rtcrtpcodeccapability-members>
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RtpCodecCapability {
    pub mime_type: String,
    pub clock_rate: u32,
    pub channels: u16,
    pub sdp_fmtp_line: String,
    pub rtcp_feedback: Vec<RtcpFeedback>,
}

/// RtpCodecParameters is a negotiated codec with its assigned payload type.
/// <https://w3c.github.io/webrtc-pc/#rtcrtpcodecparameters>
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RtpCodecParameters {
    pub capability: RtpCodecCapability,
    pub payload_type: PayloadType,
}

/// RtpHeaderExtensionParameters is a negotiated RFC 8285 header extension.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RtpHeaderExtensionParameters {
    pub uri: String,
    pub id: u8,
}

/// Direction is the attribute of a transceiver describing which of sending
/// and receiving are active.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Unspecified,
    Sendrecv,
    Sendonly,
    Recvonly,
    Inactive,
    /// Stopped is a terminal direction: once a transceiver enters it, it can
    /// never leave.
    Stopped,
}

const SENDRECV_STR: &str = "sendrecv";
const SENDONLY_STR: &str = "sendonly";
const RECVONLY_STR: &str = "recvonly";
const INACTIVE_STR: &str = "inactive";
const STOPPED_STR: &str = "stopped";

impl From<&str> for Direction {
    fn from(raw: &str) -> Self {
        match raw {
            SENDRECV_STR => Direction::Sendrecv,
            SENDONLY_STR => Direction::Sendonly,
            RECVONLY_STR => Direction::Recvonly,
            INACTIVE_STR => Direction::Inactive,
            STOPPED_STR => Direction::Stopped,
            _ => Direction::Unspecified,
        }
    }
}

impl From<u8> for Direction {
    fn from(v: u8) -> Self {
        match v {
            1 => Direction::Sendrecv,
            2 => Direction::Sendonly,
            3 => Direction::Recvonly,
            4 => Direction::Inactive,
            5 => Direction::Stopped,
            _ => Direction::Unspecified,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Sendrecv => SENDRECV_STR,
            Direction::Sendonly => SENDONLY_STR,
            Direction::Recvonly => RECVONLY_STR,
            Direction::Inactive => INACTIVE_STR,
            Direction::Stopped => STOPPED_STR,
            Direction::Unspecified => crate::UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

impl Direction {
    /// reverse swaps send-only and recv-only; every other direction
    /// (including `Stopped`) maps to itself.
    pub fn reverse(&self) -> Direction {
        match self {
            Direction::Sendonly => Direction::Recvonly,
            Direction::Recvonly => Direction::Sendonly,
            other => *other,
        }
    }
}

/// negotiated_direction computes the W3C intersection of a local desired
/// direction and a remote offered direction. `remote` is read as the remote
/// describes itself (its `sendonly` means it sends to us, so we receive).
pub fn negotiated_direction(local: Direction, remote: Direction) -> Direction {
    let wants_send = matches!(local, Direction::Sendrecv | Direction::Sendonly)
        && matches!(remote, Direction::Sendrecv | Direction::Recvonly);
    let wants_recv = matches!(local, Direction::Sendrecv | Direction::Recvonly)
        && matches!(remote, Direction::Sendrecv | Direction::Sendonly);
    match (wants_send, wants_recv) {
        (true, true) => Direction::Sendrecv,
        (true, false) => Direction::Sendonly,
        (false, true) => Direction::Recvonly,
        (false, false) => Direction::Inactive,
    }
}

/// RtpTransceiver represents one bidirectional media stream within a
/// PeerConnection. Invariant: once `mid` is set it never changes; once
/// `direction` reaches `Stopped` it never leaves that state.
pub struct RtpTransceiver {
    kind: RtpCodecType,
    mid: Mutex<Option<String>>,
    direction: AtomicU8,
    current_direction: AtomicU8,
    codecs: Mutex<Vec<RtpCodecParameters>>,
    header_extensions: Mutex<Vec<RtpHeaderExtensionParameters>>,
    sender: Mutex<Option<RtpSender>>,
    receiver: Mutex<Option<RtpReceiver>>,
}

impl RtpTransceiver {
    pub fn new(kind: RtpCodecType, direction: Direction) -> Self {
        RtpTransceiver {
            kind,
            mid: Mutex::new(None),
            direction: AtomicU8::new(direction as u8),
            current_direction: AtomicU8::new(Direction::Unspecified as u8),
            codecs: Mutex::new(Vec::new()),
            header_extensions: Mutex::new(Vec::new()),
            sender: Mutex::new(None),
            receiver: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> RtpCodecType {
        self.kind
    }

    pub fn mid(&self) -> Option<String> {
        self.mid.lock().unwrap().clone()
    }

    /// set_mid assigns the transceiver's MID the first time it negotiates.
    /// Calling it again with a different value is a bug in the caller: the
    /// MID must never change once set.
    pub fn set_mid(&self, mid: String) {
        let mut guard = self.mid.lock().unwrap();
        if let Some(existing) = guard.as_ref() {
            assert_eq!(existing, &mid, "transceiver MID must not change");
            return;
        }
        *guard = Some(mid);
    }

    pub fn direction(&self) -> Direction {
        Direction::from(self.direction.load(Ordering::SeqCst))
    }

    pub fn current_direction(&self) -> Direction {
        Direction::from(self.current_direction.load(Ordering::SeqCst))
    }

    pub fn set_current_direction(&self, direction: Direction) {
        self.current_direction
            .store(direction as u8, Ordering::SeqCst);
    }

    /// set_direction changes the transceiver's desired direction. Returns an
    /// error if the transceiver has already stopped.
    pub fn set_direction(&self, direction: Direction) -> crate::Result<()> {
        if self.direction() == Direction::Stopped {
            return Err(crate::Error::InvalidState(
                "transceiver is stopped".to_string(),
            ));
        }
        self.direction.store(direction as u8, Ordering::SeqCst);
        Ok(())
    }

    pub fn stop(&self) {
        self.direction.store(Direction::Stopped as u8, Ordering::SeqCst);
    }

    pub fn stopped(&self) -> bool {
        self.direction() == Direction::Stopped
    }

    pub fn set_codecs(&self, codecs: Vec<RtpCodecParameters>) {
        *self.codecs.lock().unwrap() = codecs;
    }

    pub fn codecs(&self) -> Vec<RtpCodecParameters> {
        self.codecs.lock().unwrap().clone()
    }

    pub fn set_header_extensions(&self, extensions: Vec<RtpHeaderExtensionParameters>) {
        *self.header_extensions.lock().unwrap() = extensions;
    }

    pub fn header_extensions(&self) -> Vec<RtpHeaderExtensionParameters> {
        self.header_extensions.lock().unwrap().clone()
    }

    pub fn set_sender(&self, sender: RtpSender) {
        *self.sender.lock().unwrap() = Some(sender);
    }

    pub fn set_receiver(&self, receiver: RtpReceiver) {
        *self.receiver.lock().unwrap() = Some(receiver);
    }

    pub fn with_sender<R>(&self, f: impl FnOnce(&mut RtpSender) -> R) -> Option<R> {
        self.sender.lock().unwrap().as_mut().map(f)
    }

    pub fn with_receiver<R>(&self, f: impl FnOnce(&mut RtpReceiver) -> R) -> Option<R> {
        self.receiver.lock().unwrap().as_mut().map(f)
    }
}

impl fmt::Debug for RtpTransceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtpTransceiver")
            .field("kind", &self.kind)
            .field("mid", &self.mid())
            .field("direction", &self.direction())
            .finish()
    }
}
