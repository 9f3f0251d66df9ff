use std::sync::Arc;

use super::*;
use crate::api::media_engine::{MIME_TYPE_H264, MIME_TYPE_OPUS, MIME_TYPE_VP8};
use crate::rtp_transceiver::{RtpCodecCapability, RtpCodecParameters, RtpCodecType, RtpTransceiver};

fn opus() -> RtpCodecParameters {
    RtpCodecParameters {
        capability: RtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_string(),
            clock_rate: 48000,
            channels: 2,
            sdp_fmtp_line: "minptime=10;useinbandfec=1".to_string(),
            rtcp_feedback: vec![],
        },
        payload_type: 111,
    }
}

fn vp8() -> RtpCodecParameters {
    RtpCodecParameters {
        capability: RtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_string(),
            clock_rate: 90000,
            channels: 0,
            sdp_fmtp_line: "".to_string(),
            rtcp_feedback: vec![],
        },
        payload_type: 96,
    }
}

#[test]
fn test_create_offer_assigns_sequential_mids_and_bundles() {
    let audio = Arc::new(RtpTransceiver::new(RtpCodecType::Audio, Direction::Sendrecv));
    audio.set_codecs(vec![opus()]);
    let video = Arc::new(RtpTransceiver::new(RtpCodecType::Video, Direction::Sendrecv));
    video.set_codecs(vec![vp8()]);

    let transceivers = vec![audio.clone(), video.clone()];
    let offer = create_offer(&transceivers, &SettingEngine::default()).unwrap();

    assert_eq!(offer.sdp_type, SdpType::Offer);
    assert_eq!(audio.mid(), Some("0".to_string()));
    assert_eq!(video.mid(), Some("1".to_string()));
    assert!(offer.sdp.contains("a=group:BUNDLE 0 1"));
    assert!(offer.sdp.contains("m=audio"));
    assert!(offer.sdp.contains("m=video"));
}

#[test]
fn test_create_offer_auto_assignment_avoids_preexisting_mid() {
    let preset = Arc::new(RtpTransceiver::new(RtpCodecType::Audio, Direction::Sendrecv));
    preset.set_mid("0".to_string());
    preset.set_codecs(vec![opus()]);
    let unset = Arc::new(RtpTransceiver::new(RtpCodecType::Video, Direction::Sendrecv));
    unset.set_codecs(vec![vp8()]);

    create_offer(&[preset.clone(), unset.clone()], &SettingEngine::default()).unwrap();

    assert_eq!(preset.mid(), Some("0".to_string()));
    assert_eq!(unset.mid(), Some("1".to_string()));
}

#[test]
fn test_create_offer_skips_stopped_transceivers() {
    let stopped = Arc::new(RtpTransceiver::new(RtpCodecType::Audio, Direction::Sendrecv));
    stopped.stop();
    let live = Arc::new(RtpTransceiver::new(RtpCodecType::Video, Direction::Sendrecv));
    live.set_codecs(vec![vp8()]);

    let offer = create_offer(&[stopped, live], &SettingEngine::default()).unwrap();
    assert_eq!(offer.sdp.matches("m=").count(), 1);
}

#[test]
fn test_create_answer_rejects_mline_on_empty_codec_intersection() {
    let local = Arc::new(RtpTransceiver::new(RtpCodecType::Audio, Direction::Sendrecv));
    local.set_codecs(vec![opus()]);
    local.set_mid("0".to_string());

    let mut h264_only = opus();
    h264_only.capability.mime_type = MIME_TYPE_H264.to_string();
    h264_only.capability.clock_rate = 90000;
    h264_only.capability.channels = 0;
    h264_only.payload_type = 102;

    let remote_sdp = SdpSession::new_jsep_session_description(false).with_media(
        sdp::description::media::MediaDescription::new_jsep_media_description(
            "audio".to_string(),
            vec![],
        )
        .with_codec(102, "H264".to_string(), 90000, 0, "".to_string())
        .with_value_attribute(ATTR_KEY_MID.to_string(), "0".to_string())
        .with_property_attribute(ATTR_KEY_SEND_RECV.to_string()),
    );

    let answer = create_answer(&[local], &remote_sdp, &SettingEngine::default()).unwrap();
    assert!(answer.description.sdp.contains("m=audio 0"));
}

#[test]
fn test_create_answer_negotiates_direction_and_keeps_offer_payload_type() {
    let local = Arc::new(RtpTransceiver::new(RtpCodecType::Audio, Direction::Sendrecv));
    local.set_codecs(vec![opus()]);
    local.set_mid("0".to_string());

    let remote_sdp = SdpSession::new_jsep_session_description(false).with_media(
        sdp::description::media::MediaDescription::new_jsep_media_description(
            "audio".to_string(),
            vec![],
        )
        .with_codec(63, "opus".to_string(), 48000, 2, "minptime=10;useinbandfec=1".to_string())
        .with_value_attribute(ATTR_KEY_MID.to_string(), "0".to_string())
        .with_property_attribute(ATTR_KEY_SEND_ONLY.to_string()),
    );

    let answer = create_answer(&[local.clone()], &remote_sdp, &SettingEngine::default()).unwrap();

    assert_eq!(local.current_direction(), Direction::Recvonly);
    assert_eq!(local.codecs()[0].payload_type, 63);
    assert!(answer.description.sdp.contains("a=recvonly"));
}

#[test]
fn test_create_answer_creates_transceiver_for_unmatched_remote_mline() {
    let remote_sdp = SdpSession::new_jsep_session_description(false).with_media(
        sdp::description::media::MediaDescription::new_jsep_media_description(
            "video".to_string(),
            vec![],
        )
        .with_codec(96, "VP8".to_string(), 90000, 0, "".to_string())
        .with_value_attribute(ATTR_KEY_MID.to_string(), "0".to_string())
        .with_property_attribute(ATTR_KEY_SEND_ONLY.to_string()),
    );

    let answer = create_answer(&[], &remote_sdp, &SettingEngine::default()).unwrap();
    assert!(answer.description.sdp.contains("m=video"));
    assert!(answer.description.sdp.contains("a=recvonly"));
    assert_eq!(answer.created_transceivers.len(), 1);
}
