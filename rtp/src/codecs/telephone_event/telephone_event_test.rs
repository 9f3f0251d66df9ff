use bytes::Bytes;

use super::*;

#[test]
fn test_depacketize_digit_mapping() {
    let raw = marshal_event(11, false, 10, 160);
    let mut pkt = TelephoneEventPacket::default();
    let payload = pkt.depacketize(&raw).unwrap();

    assert_eq!(payload, raw);
    assert_eq!(pkt.event, 11);
    assert!(!pkt.end_of_event);
    assert_eq!(pkt.volume, 10);
    assert_eq!(pkt.duration, 160);
    assert_eq!(pkt.digit(), Some('#'));
}

#[test]
fn test_depacketize_end_of_event_bit() {
    let raw = marshal_event(5, true, 0, 800);
    let mut pkt = TelephoneEventPacket::default();
    pkt.depacketize(&raw).unwrap();

    assert!(pkt.end_of_event);
    assert_eq!(pkt.digit(), Some('5'));
    assert!(pkt.is_partition_tail(true, &raw));
    assert!(!pkt.is_partition_tail(false, &raw));
}

#[test]
fn test_depacketize_too_short_errors() {
    let mut pkt = TelephoneEventPacket::default();
    assert!(pkt.depacketize(&Bytes::from_static(&[0x00, 0x00])).is_err());
}

#[test]
fn test_payloader_rejects_wrong_size() {
    let mut payloader = TelephoneEventPayloader;
    let bad = Bytes::from_static(&[0x00, 0x00, 0x00]);
    assert!(payloader.payload(1200, &bad).is_err());
}

#[test]
fn test_payloader_passthrough() {
    let mut payloader = TelephoneEventPayloader;
    let raw = marshal_event(1, false, 0, 160);
    let payloads = payloader.payload(1200, &raw).unwrap();
    assert_eq!(payloads, vec![raw]);
}
