use std::fmt;

/// SdpType describes the type of a SessionDescription.
///
/// <https://w3c.github.io/webrtc-pc/#dom-rtcsessiondescription-type>
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SdpType {
    #[default]
    Unspecified,
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

const SDP_TYPE_OFFER_STR: &str = "offer";
const SDP_TYPE_PRANSWER_STR: &str = "pranswer";
const SDP_TYPE_ANSWER_STR: &str = "answer";
const SDP_TYPE_ROLLBACK_STR: &str = "rollback";

impl From<&str> for SdpType {
    fn from(raw: &str) -> Self {
        match raw {
            SDP_TYPE_OFFER_STR => SdpType::Offer,
            SDP_TYPE_PRANSWER_STR => SdpType::Pranswer,
            SDP_TYPE_ANSWER_STR => SdpType::Answer,
            SDP_TYPE_ROLLBACK_STR => SdpType::Rollback,
            _ => SdpType::Unspecified,
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SdpType::Offer => SDP_TYPE_OFFER_STR,
            SdpType::Pranswer => SDP_TYPE_PRANSWER_STR,
            SdpType::Answer => SDP_TYPE_ANSWER_STR,
            SdpType::Rollback => SDP_TYPE_ROLLBACK_STR,
            SdpType::Unspecified => crate::UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}
