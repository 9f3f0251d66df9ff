use super::SdpType;
use crate::{Error, Result};

/// SignalingState is the state of the offer/answer negotiation.
///
/// <https://w3c.github.io/webrtc-pc/#dom-rtcsignalingstate>
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SignalingState {
    #[default]
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalPranswer,
    HaveRemotePranswer,
    Closed,
}

/// Side identifies which description (local or remote) an action sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

/// transition applies `(side, sdp_type)` to `current` and returns the next
/// signaling state, or `InvalidState` if the action is not allowed.
///
/// <https://w3c.github.io/webrtc-pc/#set-description>
pub fn transition(current: SignalingState, side: Side, sdp_type: SdpType) -> Result<SignalingState> {
    use Side::*;
    use SdpType::*;
    use SignalingState::*;

    if current == Closed {
        return Err(Error::InvalidState("signaling state is closed".to_string()));
    }

    if sdp_type == Rollback {
        return match current {
            HaveLocalOffer | HaveRemoteOffer => Ok(Stable),
            Stable => Err(Error::InvalidState(
                "rollback has nothing to roll back from".to_string(),
            )),
            _ => Err(Error::InvalidState(format!(
                "rollback not allowed from {current:?}"
            ))),
        };
    }

    match (current, side, sdp_type) {
        (Stable, Local, Offer) => Ok(HaveLocalOffer),
        (Stable, Remote, Offer) => Ok(HaveRemoteOffer),
        (HaveLocalOffer, Remote, Answer) => Ok(Stable),
        (HaveLocalOffer, Remote, Pranswer) => Ok(HaveRemotePranswer),
        (HaveRemotePranswer, Remote, Answer) => Ok(Stable),
        (HaveRemoteOffer, Local, Answer) => Ok(Stable),
        (HaveRemoteOffer, Local, Pranswer) => Ok(HaveLocalPranswer),
        (HaveLocalPranswer, Local, Answer) => Ok(Stable),
        _ => Err(Error::InvalidState(format!(
            "{side:?} set_{sdp_type} not allowed from {current:?}"
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use SdpType::*;
    use Side::*;
    use SignalingState::*;

    #[test]
    fn test_offer_answer_happy_path() {
        assert_eq!(transition(Stable, Local, Offer), Ok(HaveLocalOffer));
        assert_eq!(transition(HaveLocalOffer, Remote, Answer), Ok(Stable));

        assert_eq!(transition(Stable, Remote, Offer), Ok(HaveRemoteOffer));
        assert_eq!(transition(HaveRemoteOffer, Local, Answer), Ok(Stable));
    }

    #[test]
    fn test_pranswer_then_answer() {
        assert_eq!(transition(Stable, Local, Offer), Ok(HaveLocalOffer));
        assert_eq!(
            transition(HaveLocalOffer, Remote, Pranswer),
            Ok(HaveRemotePranswer)
        );
        assert_eq!(transition(HaveRemotePranswer, Remote, Answer), Ok(Stable));
    }

    #[test]
    fn test_rollback_from_either_offer_state_returns_to_stable() {
        assert_eq!(transition(HaveLocalOffer, Local, Rollback), Ok(Stable));
        assert_eq!(transition(HaveRemoteOffer, Remote, Rollback), Ok(Stable));
    }

    #[test]
    fn test_rollback_from_stable_is_rejected() {
        assert!(transition(Stable, Local, Rollback).is_err());
    }

    #[test]
    fn test_glare_rejected() {
        assert!(transition(HaveLocalOffer, Local, Offer).is_err());
        assert!(transition(HaveRemoteOffer, Remote, Offer).is_err());
    }

    #[test]
    fn test_closed_rejects_everything() {
        assert!(transition(Closed, Local, Offer).is_err());
    }
}
