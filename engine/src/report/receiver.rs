use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use rtcp::receiver_report::ReceiverReport;
use rtcp::reception_report::ReceptionReport;

/// ReceiverReportRecorder tracks one inbound SSRC's reception quality and
/// produces RTCP receiver reports on demand, per §4.7.
pub struct ReceiverReportRecorder {
    ssrc: u32,
    clock_rate: u32,
    cycles: u32,
    last_seq: Option<u16>,
    base_extended: Option<u32>,
    highest_extended: u32,
    lost: BTreeSet<u32>,
    last_transit: Option<f64>,
    jitter: f64,
    last_sr_ntp_middle32: Option<u32>,
    last_sr_wallclock: Option<SystemTime>,
}

impl ReceiverReportRecorder {
    pub fn new(ssrc: u32, clock_rate: u32) -> Self {
        ReceiverReportRecorder {
            ssrc,
            clock_rate,
            cycles: 0,
            last_seq: None,
            base_extended: None,
            highest_extended: 0,
            lost: BTreeSet::new(),
            last_transit: None,
            jitter: 0.0,
            last_sr_ntp_middle32: None,
            last_sr_wallclock: None,
        }
    }

    fn extend(&mut self, sequence_number: u16) -> u32 {
        if let Some(last) = self.last_seq {
            let delta = sequence_number as i32 - last as i32;
            if delta < -0x7FFF {
                self.cycles = self.cycles.wrapping_add(1);
            } else if delta > 0x7FFF {
                self.cycles = self.cycles.wrapping_sub(1);
            }
        }
        self.last_seq = Some(sequence_number);
        (self.cycles << 16) | sequence_number as u32
    }

    /// record_packet updates cumulative loss, the extended highest sequence
    /// number, and the RFC 3550 §A.8 jitter estimate for one received packet.
    pub fn record_packet(&mut self, sequence_number: u16, rtp_timestamp: u32, arrival: SystemTime) {
        let extended = self.extend(sequence_number);
        if self.base_extended.is_none() {
            self.base_extended = Some(extended);
            self.highest_extended = extended;
        } else if extended > self.highest_extended {
            for missing in (self.highest_extended + 1)..extended {
                self.lost.insert(missing);
            }
            self.highest_extended = extended;
        } else {
            self.lost.remove(&extended);
        }

        let arrival_ticks = arrival
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64()
            * self.clock_rate as f64;
        let transit = arrival_ticks - rtp_timestamp as f64;
        if let Some(last_transit) = self.last_transit {
            let d = (transit - last_transit).abs();
            self.jitter += (d - self.jitter) / 16.0;
        }
        self.last_transit = Some(transit);
    }

    /// record_sender_report latches the middle 32 bits of a received sender
    /// report's NTP timestamp and the wallclock time of reception, used to
    /// compute the `last_sender_report`/`delay` fields of the next report.
    pub fn record_sender_report(&mut self, ntp_time: u64, received_at: SystemTime) {
        self.last_sr_ntp_middle32 = Some(((ntp_time >> 16) & 0xFFFF_FFFF) as u32);
        self.last_sr_wallclock = Some(received_at);
    }

    pub fn get_report(&self, sender_ssrc: u32, now: SystemTime) -> ReceiverReport {
        let total_lost = self.lost.len() as u32;
        let expected = self
            .highest_extended
            .saturating_sub(self.base_extended.unwrap_or(0))
            + 1;
        let fraction_lost = if expected == 0 {
            0
        } else {
            ((total_lost as u64 * 256) / expected as u64).min(255) as u8
        };

        let (last_sender_report, delay) = match (self.last_sr_ntp_middle32, self.last_sr_wallclock)
        {
            (Some(lsr), Some(received_at)) => {
                let elapsed = now
                    .duration_since(received_at)
                    .unwrap_or(Duration::ZERO)
                    .as_secs_f64();
                (lsr, (elapsed * 65536.0) as u32)
            }
            _ => (0, 0),
        };

        ReceiverReport {
            ssrc: sender_ssrc,
            reports: vec![ReceptionReport {
                ssrc: self.ssrc,
                fraction_lost,
                total_lost,
                last_sequence_number: self.highest_extended,
                jitter: self.jitter as u32,
                last_sender_report,
                delay,
            }],
            profile_extensions: Bytes::new(),
        }
    }
}
