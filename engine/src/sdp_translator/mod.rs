pub mod sdp_type;
pub mod signaling_state;

#[cfg(test)]
mod sdp_translator_test;

pub use sdp_type::SdpType;
pub use signaling_state::{transition, Side, SignalingState};

use std::io::Cursor;
use std::sync::Arc;

use sdp::description::media::MediaDescription;
use sdp::description::session::{
    SessionDescription as SdpSession, ATTR_KEY_GROUP, ATTR_KEY_INACTIVE, ATTR_KEY_MID,
    ATTR_KEY_RECV_ONLY, ATTR_KEY_SEND_ONLY, ATTR_KEY_SEND_RECV,
};

use crate::api::setting_engine::{BundlePolicy, SettingEngine};
use crate::rtp_transceiver::{
    Direction, RtpCodecCapability, RtpCodecParameters, RtpCodecType, RtpHeaderExtensionParameters,
    RtpTransceiver,
};
use crate::{Error, Result};

/// MID_HDREXT_URI is the RFC 8843 header extension that carries a packet's
/// MID so the demuxer can bind it before SSRCs are known.
pub const MID_HDREXT_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:mid";
pub const RID_HDREXT_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id";
pub const REPAIRED_RID_HDREXT_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id";

/// SessionDescription is the JSEP-level `{type, sdp}` pair exchanged between
/// applications, as opposed to `sdp::SessionDescription` which is the parsed
/// attribute tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
}

/// parse turns JSEP SDP text into the attribute tree the rest of this module
/// operates on.
pub fn parse(sdp_text: &str) -> Result<SdpSession> {
    let mut reader = Cursor::new(sdp_text.as_bytes());
    SdpSession::unmarshal(&mut reader).map_err(Error::from)
}

fn direction_attribute_key(direction: Direction) -> &'static str {
    match direction {
        Direction::Sendrecv => ATTR_KEY_SEND_RECV,
        Direction::Sendonly => ATTR_KEY_SEND_ONLY,
        Direction::Recvonly => ATTR_KEY_RECV_ONLY,
        _ => ATTR_KEY_INACTIVE,
    }
}

pub(crate) fn direction_from_media(media: &MediaDescription) -> Direction {
    for (key, direction) in [
        (ATTR_KEY_SEND_RECV, Direction::Sendrecv),
        (ATTR_KEY_SEND_ONLY, Direction::Sendonly),
        (ATTR_KEY_RECV_ONLY, Direction::Recvonly),
        (ATTR_KEY_INACTIVE, Direction::Inactive),
    ] {
        if media.has_attribute(key) {
            return direction;
        }
    }
    Direction::Sendrecv
}

/// codec_kind_str maps a transceiver kind to the SDP `m=` media token.
fn kind_str(kind: RtpCodecType) -> &'static str {
    match kind {
        RtpCodecType::Audio => "audio",
        RtpCodecType::Video => "video",
        RtpCodecType::Unspecified => "application",
    }
}

/// fmtp_equivalent implements the fmtp-equivalence rule: H264 requires a
/// byte-equal profile-level-id, VP8 ignores fmtp entirely, everything else
/// requires byte-equal fmtp lines.
fn fmtp_equivalent(mime_type: &str, a: &str, b: &str) -> bool {
    if mime_type.eq_ignore_ascii_case(crate::api::media_engine::MIME_TYPE_VP8) {
        return true;
    }
    if mime_type.eq_ignore_ascii_case(crate::api::media_engine::MIME_TYPE_H264) {
        let profile = |fmtp: &str| {
            fmtp.split(';')
                .find_map(|kv| kv.trim().strip_prefix("profile-level-id="))
                .map(|v| v.to_ascii_lowercase())
        };
        return profile(a) == profile(b);
    }
    a == b
}

/// codecs_match implements the codec-intersection rule of the answer path:
/// MIME type case-insensitive, clock rate and channel count exact, fmtp per
/// `fmtp_equivalent`.
fn codecs_match(local: &RtpCodecParameters, remote: &RtpCodecParameters) -> bool {
    local
        .capability
        .mime_type
        .eq_ignore_ascii_case(&remote.capability.mime_type)
        && local.capability.clock_rate == remote.capability.clock_rate
        && local.capability.channels == remote.capability.channels
        && fmtp_equivalent(
            &local.capability.mime_type,
            &local.capability.sdp_fmtp_line,
            &remote.capability.sdp_fmtp_line,
        )
}

/// rtx_apt extracts the payload type an RTX codec's `apt=` fmtp parameter
/// points at, if any.
fn rtx_apt(codec: &RtpCodecParameters) -> Option<u8> {
    codec
        .capability
        .sdp_fmtp_line
        .split(';')
        .find_map(|kv| kv.trim().strip_prefix("apt="))
        .and_then(|v| v.parse().ok())
}

fn header_extensions_for(kind: RtpCodecType, simulcast: bool) -> Vec<RtpHeaderExtensionParameters> {
    let mut exts = vec![RtpHeaderExtensionParameters {
        uri: MID_HDREXT_URI.to_string(),
        id: 1,
    }];
    if kind == RtpCodecType::Video && simulcast {
        exts.push(RtpHeaderExtensionParameters {
            uri: RID_HDREXT_URI.to_string(),
            id: 2,
        });
        exts.push(RtpHeaderExtensionParameters {
            uri: REPAIRED_RID_HDREXT_URI.to_string(),
            id: 3,
        });
    }
    exts
}

fn media_description_for_transceiver(
    transceiver: &Arc<RtpTransceiver>,
    mid: &str,
    codecs: &[RtpCodecParameters],
    extensions: &[RtpHeaderExtensionParameters],
    direction: Direction,
    reject: bool,
) -> MediaDescription {
    let mut media =
        MediaDescription::new_jsep_media_description(kind_str(transceiver.kind()).to_string(), vec![]);

    if reject {
        media.media_name.port.value = 0;
        return media.with_value_attribute(ATTR_KEY_MID.to_string(), mid.to_string());
    }

    for codec in codecs {
        media = media.with_codec(
            codec.payload_type,
            codec
                .capability
                .mime_type
                .splitn(2, '/')
                .nth(1)
                .unwrap_or(&codec.capability.mime_type)
                .to_string(),
            codec.capability.clock_rate,
            codec.capability.channels,
            codec.capability.sdp_fmtp_line.clone(),
        );
        for fb in &codec.capability.rtcp_feedback {
            let value = if fb.parameter.is_empty() {
                format!("{} {}", codec.payload_type, fb.typ)
            } else {
                format!("{} {} {}", codec.payload_type, fb.typ, fb.parameter)
            };
            media = media.with_value_attribute("rtcp-fb".to_string(), value);
        }
    }

    for (idx, ext) in extensions.iter().enumerate() {
        media = media.with_value_attribute(
            "extmap".to_string(),
            format!("{} {}", idx + 1, ext.uri),
        );
    }

    media
        .with_value_attribute(ATTR_KEY_MID.to_string(), mid.to_string())
        .with_property_attribute(direction_attribute_key(direction).to_string())
}

/// create_offer implements the offer-creation rules of the offer/answer
/// processor: one m-line per non-stopped transceiver in creation order, a
/// MID assigned on first use, the transceiver's configured codec list and
/// direction, and a shared ICE ufrag/pwd/fingerprint across all m-lines.
pub fn create_offer(
    transceivers: &[Arc<RtpTransceiver>],
    setting_engine: &SettingEngine,
) -> Result<SessionDescription> {
    let mut session = SdpSession::new_jsep_session_description(false);
    let mut mids = Vec::new();

    let existing: Vec<Option<String>> = transceivers.iter().map(|t| t.mid()).collect();
    let mut next_mid = 0usize;
    let assigned: Vec<String> = existing
        .iter()
        .zip(transceivers.iter())
        .map(|(mid, t)| {
            if let Some(mid) = mid {
                mid.clone()
            } else {
                while existing.iter().flatten().any(|m| m == &next_mid.to_string()) {
                    next_mid += 1;
                }
                let mid = next_mid.to_string();
                next_mid += 1;
                t.set_mid(mid.clone());
                mid
            }
        })
        .collect();

    for (transceiver, mid) in transceivers.iter().zip(assigned.iter()) {
        if transceiver.stopped() {
            continue;
        }
        let codecs = transceiver.codecs();
        let extensions = header_extensions_for(transceiver.kind(), false);
        let media = media_description_for_transceiver(
            transceiver,
            mid,
            &codecs,
            &extensions,
            transceiver.direction(),
            false,
        );
        mids.push(mid.clone());
        session = session.with_media(media);
    }

    if setting_engine.bundle_policy() == BundlePolicy::MaxBundle {
        session = session
            .with_value_attribute(ATTR_KEY_GROUP.to_string(), format!("BUNDLE {}", mids.join(" ")));
    }

    Ok(SessionDescription {
        sdp_type: SdpType::Offer,
        sdp: session.marshal(),
    })
}

/// match_remote_media finds, per §4.1 answer creation, the local transceiver
/// a remote m-line negotiates against: by MID if the remote named one that a
/// local transceiver already carries, otherwise by kind against the
/// earliest unused transceiver of that kind; a remote m-line with no
/// available local transceiver is created as a fresh recvonly one.
fn match_remote_media(
    media: &MediaDescription,
    transceivers: &[Arc<RtpTransceiver>],
    used: &mut Vec<bool>,
    created: &mut Vec<Arc<RtpTransceiver>>,
) -> (Arc<RtpTransceiver>, Direction) {
    let remote_mid = media.attribute(ATTR_KEY_MID).flatten();
    let remote_kind = RtpCodecType::from(media.media_name.media.as_str());

    if let Some(mid) = remote_mid {
        if let Some((idx, t)) = transceivers
            .iter()
            .enumerate()
            .find(|(_, t)| t.mid().as_deref() == Some(mid))
        {
            used[idx] = true;
            return (t.clone(), direction_from_media(media));
        }
    }

    if let Some((idx, t)) = transceivers
        .iter()
        .enumerate()
        .find(|(idx, t)| !used[*idx] && t.kind() == remote_kind && !t.stopped())
    {
        used[idx] = true;
        return (t.clone(), direction_from_media(media));
    }

    let fresh = Arc::new(RtpTransceiver::new(remote_kind, Direction::Recvonly));
    created.push(fresh.clone());
    (fresh, direction_from_media(media))
}

pub(crate) fn intersect_codecs(
    local: &[RtpCodecParameters],
    remote: &[RtpCodecParameters],
) -> Vec<RtpCodecParameters> {
    let mut matched: Vec<RtpCodecParameters> = remote
        .iter()
        .filter_map(|r| {
            local
                .iter()
                .find(|l| codecs_match(l, r))
                .map(|l| RtpCodecParameters {
                    capability: l.capability.clone(),
                    payload_type: r.payload_type,
                })
        })
        .collect();

    let retained_pts: Vec<u8> = matched.iter().map(|c| c.payload_type).collect();
    for r in remote {
        if let Some(apt) = rtx_apt(r) {
            if retained_pts.contains(&apt) && !matched.iter().any(|m| m.payload_type == r.payload_type)
            {
                if let Some(l) = local.iter().find(|l| codecs_match(l, r)) {
                    matched.push(RtpCodecParameters {
                        capability: l.capability.clone(),
                        payload_type: r.payload_type,
                    });
                }
            }
        }
    }
    matched
}

/// AnswerResult carries the rendered answer together with any recvonly
/// transceiver the answer path had to create for a remote m-line that
/// didn't match an existing local one.
pub struct AnswerResult {
    pub description: SessionDescription,
    pub created_transceivers: Vec<Arc<RtpTransceiver>>,
}

/// create_answer implements the answer-creation rules of §4.1: match each
/// remote m-line to a local transceiver, intersect codecs (rejecting the
/// m-line on an empty intersection), and negotiate direction per the W3C
/// table.
pub fn create_answer(
    transceivers: &[Arc<RtpTransceiver>],
    remote: &SdpSession,
    setting_engine: &SettingEngine,
) -> Result<AnswerResult> {
    let mut session = SdpSession::new_jsep_session_description(false);
    let mut used = vec![false; transceivers.len()];
    let mut mids = Vec::new();
    let mut created = Vec::new();

    for remote_media in &remote.media_descriptions {
        let (transceiver, remote_direction) =
            match_remote_media(remote_media, transceivers, &mut used, &mut created);

        let mid = remote_media
            .attribute(ATTR_KEY_MID)
            .flatten()
            .map(|s| s.to_string())
            .unwrap_or_default();
        transceiver.set_mid(mid.clone());

        let remote_codecs = parse_remote_codecs(remote_media);
        let local_codecs = transceiver.codecs();
        let intersection = intersect_codecs(&local_codecs, &remote_codecs);

        let reject = intersection.is_empty();
        let negotiated = crate::rtp_transceiver::negotiated_direction(
            transceiver.direction(),
            remote_direction,
        );
        transceiver.set_current_direction(if reject {
            Direction::Inactive
        } else {
            negotiated
        });
        if !reject {
            transceiver.set_codecs(intersection.clone());
        }

        let extensions = header_extensions_for(transceiver.kind(), false);
        let media = media_description_for_transceiver(
            &transceiver,
            &mid,
            &intersection,
            &extensions,
            transceiver.current_direction(),
            reject,
        );
        mids.push(mid);
        session = session.with_media(media);
    }

    if setting_engine.bundle_policy() == BundlePolicy::MaxBundle {
        session = session
            .with_value_attribute(ATTR_KEY_GROUP.to_string(), format!("BUNDLE {}", mids.join(" ")));
    }

    Ok(AnswerResult {
        description: SessionDescription {
            sdp_type: SdpType::Answer,
            sdp: session.marshal(),
        },
        created_transceivers: created,
    })
}

pub(crate) fn parse_remote_codecs(media: &MediaDescription) -> Vec<RtpCodecParameters> {
    let mut codecs = Vec::new();
    for fmt in &media.media_name.formats {
        let Ok(payload_type) = fmt.parse::<u8>() else {
            continue;
        };
        let rtpmap = media.attributes.iter().find_map(|a| {
            if a.key != "rtpmap" {
                return None;
            }
            let value = a.value.as_ref()?;
            let (pt, rest) = value.split_once(' ')?;
            if pt.parse::<u8>().ok()? != payload_type {
                return None;
            }
            Some(rest.to_string())
        });
        let Some(rtpmap) = rtpmap else { continue };
        let mut parts = rtpmap.splitn(2, '/');
        let name = parts.next().unwrap_or_default();
        let mut rate_and_channels = parts.next().unwrap_or_default().splitn(2, '/');
        let clock_rate = rate_and_channels
            .next()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let channels = rate_and_channels
            .next()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let fmtp = media
            .attributes
            .iter()
            .find_map(|a| {
                if a.key != "fmtp" {
                    return None;
                }
                let value = a.value.as_ref()?;
                let (pt, rest) = value.split_once(' ')?;
                if pt.parse::<u8>().ok()? != payload_type {
                    return None;
                }
                Some(rest.to_string())
            })
            .unwrap_or_default();

        let kind = RtpCodecType::from(media.media_name.media.as_str());
        let mime_type = format!("{}/{}", kind_str(kind), name);

        codecs.push(RtpCodecParameters {
            capability: RtpCodecCapability {
                mime_type,
                clock_rate,
                channels,
                sdp_fmtp_line: fmtp,
                rtcp_feedback: vec![],
            },
            payload_type,
        });
    }
    codecs
}
