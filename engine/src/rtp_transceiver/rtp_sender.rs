use std::sync::atomic::{AtomicU16, Ordering};

use rtp::packet::Packet;

use crate::nack::NackResponder;
use crate::report::SenderReportRecorder;
use crate::track::TrackLocal;

use super::{PayloadType, Ssrc};

/// RtpSender owns one outbound SSRC (and an optional RTX SSRC), the packet
/// sequence counter, the sender report recorder, and the NACK responder for
/// one transceiver's send side.
pub struct RtpSender {
    ssrc: Ssrc,
    rtx_ssrc: Option<Ssrc>,
    track: Option<TrackLocal>,
    sequence_number: AtomicU16,
    report_recorder: SenderReportRecorder,
    nack_responder: Option<NackResponder>,
}

impl RtpSender {
    pub fn new(ssrc: Ssrc, clock_rate: u32, track: Option<TrackLocal>) -> Self {
        RtpSender {
            ssrc,
            rtx_ssrc: None,
            track,
            sequence_number: AtomicU16::new(0),
            report_recorder: SenderReportRecorder::new(ssrc, clock_rate),
            nack_responder: None,
        }
    }

    /// enable_rtx turns on RTX retransmission for this sender.
    pub fn enable_rtx(&mut self, rtx_ssrc: Ssrc, rtx_payload_type: PayloadType) {
        self.rtx_ssrc = Some(rtx_ssrc);
        self.nack_responder = Some(NackResponder::new(rtx_ssrc, rtx_payload_type));
    }

    pub fn ssrc(&self) -> Ssrc {
        self.ssrc
    }

    pub fn rtx_ssrc(&self) -> Option<Ssrc> {
        self.rtx_ssrc
    }

    pub fn track(&self) -> Option<&TrackLocal> {
        self.track.as_ref()
    }

    pub fn set_track(&mut self, track: Option<TrackLocal>) {
        self.track = track;
    }

    /// next_sequence_number assigns and advances this sender's outbound
    /// sequence counter.
    pub fn next_sequence_number(&self) -> u16 {
        self.sequence_number.fetch_add(1, Ordering::SeqCst)
    }

    /// on_send records one outbound packet in the sender report recorder and
    /// (when RTX is enabled) the NACK responder's ring.
    pub fn on_send(&mut self, packet: &Packet, now: std::time::SystemTime) {
        self.report_recorder.record_packet(
            packet.header.sequence_number,
            packet.header.timestamp,
            packet.payload.len(),
            now,
        );
        if let Some(responder) = &mut self.nack_responder {
            responder.record(packet.clone());
        }
    }

    /// on_nack answers a list of NACK'd sequence numbers with RTX packets, or
    /// an empty list when RTX is not enabled for this sender.
    pub fn on_nack(&mut self, lost_seqs: &[u16]) -> Vec<Packet> {
        match &mut self.nack_responder {
            Some(responder) => responder.respond(lost_seqs),
            None => Vec::new(),
        }
    }

    pub fn get_report(&self, now: std::time::SystemTime) -> rtcp::sender_report::SenderReport {
        self.report_recorder.get_report(now)
    }
}
