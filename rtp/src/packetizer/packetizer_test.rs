use std::time::{Duration, UNIX_EPOCH};

use super::*;
use crate::codecs::opus::OpusPayloader;
use crate::error::Result;
use crate::header::ExtensionProfile;

#[test]
fn test_packetizer() -> Result<()> {
    let multiple_payload = Bytes::from_static(&[0; 128]);
    let payloader = Box::new(OpusPayloader);
    let seq = Box::new(new_random_sequencer());

    let mut packetizer = new_packetizer(100, 98, 0x1234ABCD, payloader, seq, 90000);
    let packets = packetizer.packetize(&multiple_payload, 2000)?;

    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].payload.len(), 128);
    assert!(packets[0].header.marker);

    Ok(())
}

#[test]
fn test_packetizer_abs_send_time() -> Result<()> {
    let payloader = Box::new(OpusPayloader);
    let sequencer = Box::new(new_fixed_sequencer(1234));

    let time_gen: Option<FnTimeGen> = Some(Arc::new(|| {
        UNIX_EPOCH
            .checked_add(Duration::from_secs(489283200)) // 1985-06-23T04:00:00Z
            .unwrap_or(UNIX_EPOCH)
    }));

    let mut pktizer = PacketizerImpl {
        mtu: 100,
        payload_type: 98,
        ssrc: 0x1234ABCD,
        payloader,
        sequencer,
        timestamp: 45678,
        clock_rate: 90000,
        abs_send_time: 0,
        time_gen,
    };
    pktizer.enable_abs_send_time(1);

    let payload = Bytes::from_static(&[0x11, 0x12, 0x13, 0x14]);
    let packets = pktizer.packetize(&payload, 2000)?;

    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].header.sequence_number, 1234);
    assert_eq!(packets[0].header.ssrc, 0x1234ABCD);
    assert!(packets[0].header.extension);
    assert_eq!(
        packets[0].header.extension_profile,
        u16::from(ExtensionProfile::OneByte)
    );
    assert_eq!(packets[0].header.extensions.len(), 1);
    assert_eq!(packets[0].header.extensions[0].id, 1);
    assert_eq!(&packets[0].payload[..], &[0x11, 0x12, 0x13, 0x14][..]);

    Ok(())
}

#[test]
fn test_packetizer_timestamp_rollover_does_not_panic() -> Result<()> {
    let payloader = Box::new(OpusPayloader);
    let seq = Box::new(new_random_sequencer());

    let payload = Bytes::from_static(&[0; 128]);
    let mut packetizer = new_packetizer(100, 98, 0x1234ABCD, payloader, seq, 90000);

    packetizer.packetize(&payload, 10)?;
    packetizer.packetize(&payload, u32::MAX)?;
    packetizer.skip_samples(u32::MAX);

    Ok(())
}

