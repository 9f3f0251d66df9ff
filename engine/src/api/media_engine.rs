#[cfg(test)]
mod media_engine_test;

use crate::rtp_transceiver::{RtcpFeedback, RtpCodecCapability, RtpCodecParameters, RtpCodecType};

/// MIME type constants. Matching against these must be case-insensitive.
pub const MIME_TYPE_VP8: &str = "video/VP8";
pub const MIME_TYPE_H264: &str = "video/H264";
pub const MIME_TYPE_RTX: &str = "video/rtx";
pub const MIME_TYPE_OPUS: &str = "audio/opus";
pub const MIME_TYPE_TELEPHONE_EVENT: &str = "audio/telephone-event";

/// A MediaEngine defines the codecs a PeerConnection is willing to
/// negotiate and their registered parameters. A MediaEngine must not be
/// shared between PeerConnections that are negotiating concurrently, but the
/// codec list itself is immutable after registration, so sharing via `Clone`
/// is safe between sequential uses.
#[derive(Default, Clone)]
pub struct MediaEngine {
    audio_codecs: Vec<RtpCodecParameters>,
    video_codecs: Vec<RtpCodecParameters>,
}

impl MediaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_codec(&mut self, codec: RtpCodecParameters, kind: RtpCodecType) {
        match kind {
            RtpCodecType::Audio => self.audio_codecs.push(codec),
            RtpCodecType::Video => self.video_codecs.push(codec),
            RtpCodecType::Unspecified => {}
        }
    }

    /// register_default_codecs registers Opus, telephone-event, VP8, H264,
    /// and their matching RTX entries.
    pub fn register_default_codecs(&mut self) {
        self.register_codec(
            RtpCodecParameters {
                capability: RtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
                    rtcp_feedback: vec![],
                },
                payload_type: 111,
            },
            RtpCodecType::Audio,
        );
        self.register_codec(
            RtpCodecParameters {
                capability: RtpCodecCapability {
                    mime_type: MIME_TYPE_TELEPHONE_EVENT.to_owned(),
                    clock_rate: 8000,
                    channels: 0,
                    sdp_fmtp_line: "0-15".to_owned(),
                    rtcp_feedback: vec![],
                },
                payload_type: 126,
            },
            RtpCodecType::Audio,
        );

        let video_rtcp_feedback = vec![
            RtcpFeedback {
                typ: "goog-remb".to_owned(),
                parameter: "".to_owned(),
            },
            RtcpFeedback {
                typ: "ccm".to_owned(),
                parameter: "fir".to_owned(),
            },
            RtcpFeedback {
                typ: "nack".to_owned(),
                parameter: "".to_owned(),
            },
            RtcpFeedback {
                typ: "nack".to_owned(),
                parameter: "pli".to_owned(),
            },
        ];
        self.register_codec(
            RtpCodecParameters {
                capability: RtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    rtcp_feedback: video_rtcp_feedback.clone(),
                },
                payload_type: 96,
            },
            RtpCodecType::Video,
        );
        self.register_codec(
            RtpCodecParameters {
                capability: RtpCodecCapability {
                    mime_type: MIME_TYPE_RTX.to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line: "apt=96".to_owned(),
                    rtcp_feedback: vec![],
                },
                payload_type: 97,
            },
            RtpCodecType::Video,
        );
        self.register_codec(
            RtpCodecParameters {
                capability: RtpCodecCapability {
                    mime_type: MIME_TYPE_H264.to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line:
                        "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f"
                            .to_owned(),
                    rtcp_feedback: video_rtcp_feedback,
                },
                payload_type: 102,
            },
            RtpCodecType::Video,
        );
    }

    pub fn codecs(&self, kind: RtpCodecType) -> &[RtpCodecParameters] {
        match kind {
            RtpCodecType::Audio => &self.audio_codecs,
            RtpCodecType::Video => &self.video_codecs,
            RtpCodecType::Unspecified => &[],
        }
    }

    /// rtx_payload_type_for returns the payload type of the RTX codec whose
    /// `apt=` fmtp parameter points at `primary`, when one is registered.
    pub fn rtx_payload_type_for(&self, primary: u8, kind: RtpCodecType) -> Option<u8> {
        self.codecs(kind).iter().find_map(|c| {
            if c.capability.mime_type.eq_ignore_ascii_case(MIME_TYPE_RTX)
                && c.capability.sdp_fmtp_line == format!("apt={primary}")
            {
                Some(c.payload_type)
            } else {
                None
            }
        })
    }
}
