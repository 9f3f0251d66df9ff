use std::fmt;

/// PeerConnectionState summarizes the combined state of the ICE and DTLS
/// transports, per the W3C connectionState algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PeerConnectionState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

const NEW_STR: &str = "new";
const CONNECTING_STR: &str = "connecting";
const CONNECTED_STR: &str = "connected";
const DISCONNECTED_STR: &str = "disconnected";
const FAILED_STR: &str = "failed";
const CLOSED_STR: &str = "closed";

impl fmt::Display for PeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeerConnectionState::New => NEW_STR,
            PeerConnectionState::Connecting => CONNECTING_STR,
            PeerConnectionState::Connected => CONNECTED_STR,
            PeerConnectionState::Disconnected => DISCONNECTED_STR,
            PeerConnectionState::Failed => FAILED_STR,
            PeerConnectionState::Closed => CLOSED_STR,
        };
        write!(f, "{s}")
    }
}

/// from_transports implements the W3C connectionState algorithm: the
/// combined state is the worst of the ICE and DTLS transport states, with
/// `closed` only once both transports (or the PeerConnection itself) have
/// closed.
pub fn from_transports(
    ice: crate::transport::IceConnectionState,
    dtls: crate::transport::DtlsTransportState,
) -> PeerConnectionState {
    use crate::transport::{DtlsTransportState as D, IceConnectionState as I};

    if ice == I::Failed || dtls == D::Failed {
        return PeerConnectionState::Failed;
    }
    if ice == I::Closed && dtls == D::Closed {
        return PeerConnectionState::Closed;
    }
    if ice == I::Disconnected {
        return PeerConnectionState::Disconnected;
    }
    let connected = matches!(ice, I::Connected | I::Completed | I::Closed)
        && matches!(dtls, D::Connected | D::Closed);
    if connected {
        return PeerConnectionState::Connected;
    }
    let connecting = matches!(ice, I::Checking) || matches!(dtls, D::Connecting);
    if connecting {
        return PeerConnectionState::Connecting;
    }
    PeerConnectionState::New
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::{DtlsTransportState as D, IceConnectionState as I};

    #[test]
    fn test_both_new_is_new() {
        assert_eq!(from_transports(I::New, D::New), PeerConnectionState::New);
    }

    #[test]
    fn test_checking_is_connecting() {
        assert_eq!(
            from_transports(I::Checking, D::New),
            PeerConnectionState::Connecting
        );
    }

    #[test]
    fn test_both_connected_is_connected() {
        assert_eq!(
            from_transports(I::Connected, D::Connected),
            PeerConnectionState::Connected
        );
    }

    #[test]
    fn test_either_failed_is_failed() {
        assert_eq!(
            from_transports(I::Failed, D::New),
            PeerConnectionState::Failed
        );
        assert_eq!(
            from_transports(I::Connected, D::Failed),
            PeerConnectionState::Failed
        );
    }

    #[test]
    fn test_disconnected_takes_priority_over_new() {
        assert_eq!(
            from_transports(I::Disconnected, D::New),
            PeerConnectionState::Disconnected
        );
    }

    #[test]
    fn test_both_closed_is_closed() {
        assert_eq!(
            from_transports(I::Closed, D::Closed),
            PeerConnectionState::Closed
        );
    }
}
