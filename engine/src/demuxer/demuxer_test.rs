use super::*;

#[test]
fn test_bind_via_mid_extension() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[111]);

    assert_eq!(
        d.route(1234, 10, Some("0"), 111),
        Route::Bound("0".to_string())
    );
}

#[test]
fn test_rebind_via_higher_sequence_mid() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[111]);
    d.register_mid("1", &[111]);

    assert_eq!(
        d.route(1234, 10, Some("0"), 111),
        Route::Bound("0".to_string())
    );
    // A strictly greater extension sequence number carrying a different MID
    // rebinds the SSRC.
    assert_eq!(
        d.route(1234, 11, Some("1"), 111),
        Route::Bound("1".to_string())
    );
}

#[test]
fn test_regressed_sequence_never_rebinds() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[111]);
    d.register_mid("1", &[111]);

    d.route(1234, 20, Some("0"), 111);
    // Lower extension sequence number must not rebind, even with a new MID.
    assert_eq!(
        d.route(1234, 5, Some("1"), 111),
        Route::Bound("0".to_string())
    );
}

#[test]
fn test_fallback_to_ssrc_cache_without_extension() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[111]);

    d.route(1234, 20, Some("0"), 111);
    assert_eq!(d.route(1234, 21, None, 111), Route::Bound("0".to_string()));
}

#[test]
fn test_unambiguous_payload_type_binds_fresh_ssrc() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[111]);

    assert_eq!(d.route(5678, 1, None, 111), Route::Bound("0".to_string()));
}

#[test]
fn test_ambiguous_payload_type_is_unmatched_for_fresh_ssrc() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[96]);
    d.register_mid("1", &[96]);

    assert_eq!(d.route(9999, 1, None, 96), Route::Unmatched);
}

#[test]
fn test_unknown_ssrc_and_payload_type_is_unmatched() {
    let mut d = Demuxer::new();
    d.register_mid("0", &[111]);

    assert_eq!(d.route(42, 1, None, 200), Route::Unmatched);
}
