use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rtcp::sender_report::SenderReport;

use super::ntp_timestamp;

#[derive(Debug, Clone, Copy)]
struct LastPacket {
    rtp_timestamp: u32,
    wallclock: SystemTime,
    sequence_number: u16,
}

/// SenderReportRecorder tracks one outbound SSRC's packet stream and
/// produces RTCP sender reports on demand, per §4.6.
pub struct SenderReportRecorder {
    sender_ssrc: u32,
    clock_rate: u32,
    last: Option<LastPacket>,
    packet_count: u32,
    octet_count: u32,
}

impl SenderReportRecorder {
    pub fn new(sender_ssrc: u32, clock_rate: u32) -> Self {
        SenderReportRecorder {
            sender_ssrc,
            clock_rate,
            last: None,
            packet_count: 0,
            octet_count: 0,
        }
    }

    /// record_packet updates the running counters for every outbound packet.
    /// Only in-order packets (strictly increasing sequence number) update the
    /// "last" triple used to extrapolate the next report's RTP timestamp.
    pub fn record_packet(
        &mut self,
        sequence_number: u16,
        rtp_timestamp: u32,
        payload_len: usize,
        now: SystemTime,
    ) {
        self.packet_count += 1;
        self.octet_count += payload_len as u32;

        let in_order = match self.last {
            None => true,
            Some(last) => sequence_number.wrapping_sub(last.sequence_number) as i16 > 0,
        };
        if in_order {
            self.last = Some(LastPacket {
                rtp_timestamp,
                wallclock: now,
                sequence_number,
            });
        }
    }

    /// get_report computes a sender report as of `now`, extrapolating the RTP
    /// timestamp from the last in-order packet's timestamp and wallclock.
    pub fn get_report(&self, now: SystemTime) -> SenderReport {
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        let ntp_time = ntp_timestamp(since_epoch);

        let rtp_time = match self.last {
            Some(last) => {
                let elapsed = now
                    .duration_since(last.wallclock)
                    .unwrap_or(Duration::ZERO)
                    .as_secs_f64();
                let extrapolated = elapsed * self.clock_rate as f64;
                last.rtp_timestamp.wrapping_add(extrapolated as u32)
            }
            None => 0,
        };

        SenderReport {
            ssrc: self.sender_ssrc,
            ntp_time,
            rtp_time,
            packet_count: self.packet_count,
            octet_count: self.octet_count,
            reports: vec![],
            profile_extensions: bytes::Bytes::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_out_of_order_packet_does_not_move_the_last_triple() {
        let mut r = SenderReportRecorder::new(1234, 90000);
        let t0 = UNIX_EPOCH + Duration::from_secs(100);
        r.record_packet(10, 1000, 100, t0);
        r.record_packet(9, 900, 50, t0); // out of order

        let report = r.get_report(t0);
        assert_eq!(report.rtp_time, 1000);
        assert_eq!(report.packet_count, 2);
        assert_eq!(report.octet_count, 150);
    }

    #[test]
    fn test_rtp_timestamp_extrapolates_with_elapsed_time() {
        let mut r = SenderReportRecorder::new(1234, 1000);
        let t0 = UNIX_EPOCH + Duration::from_secs(100);
        r.record_packet(1, 5000, 10, t0);

        let report = r.get_report(t0 + Duration::from_secs(2));
        assert_eq!(report.rtp_time, 7000);
    }
}
