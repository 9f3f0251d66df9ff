use super::*;

#[test]
fn test_register_default_codecs_populates_both_kinds() {
    let mut m = MediaEngine::new();
    m.register_default_codecs();

    assert!(!m.codecs(RtpCodecType::Audio).is_empty());
    assert!(!m.codecs(RtpCodecType::Video).is_empty());
}

#[test]
fn test_rtx_payload_type_lookup_matches_apt() {
    let mut m = MediaEngine::new();
    m.register_default_codecs();

    assert_eq!(m.rtx_payload_type_for(96, RtpCodecType::Video), Some(97));
    assert_eq!(m.rtx_payload_type_for(102, RtpCodecType::Video), None);
}

#[test]
fn test_unspecified_kind_has_no_codecs() {
    let m = MediaEngine::new();
    assert!(m.codecs(RtpCodecType::Unspecified).is_empty());
}
