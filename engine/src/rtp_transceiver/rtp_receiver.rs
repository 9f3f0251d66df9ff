use std::collections::HashMap;

use rtp::packet::Packet;

use crate::jitter_buffer::JitterBuffer;
use crate::nack::NackGenerator;
use crate::report::ReceiverReportRecorder;
use crate::track::TrackRemote;

use super::{RtpCodecType, Ssrc};

struct Stream {
    jitter_buffer: JitterBuffer,
    nack_generator: NackGenerator,
    report_recorder: ReceiverReportRecorder,
    track: TrackRemote,
}

/// RtpReceiver owns every inbound SSRC this transceiver has observed (one
/// per simulcast layer when RID extensions are present), each with its own
/// jitter buffer, NACK generator and receiver report recorder.
pub struct RtpReceiver {
    kind: RtpCodecType,
    clock_rate: u32,
    jitter_latency_ms: u64,
    sender_ssrc: Ssrc,
    streams: HashMap<Ssrc, Stream>,
}

impl RtpReceiver {
    pub fn new(kind: RtpCodecType, clock_rate: u32, jitter_latency_ms: u64, sender_ssrc: Ssrc) -> Self {
        RtpReceiver {
            kind,
            clock_rate,
            jitter_latency_ms,
            sender_ssrc,
            streams: HashMap::new(),
        }
    }

    pub fn kind(&self) -> RtpCodecType {
        self.kind
    }

    pub fn ssrcs(&self) -> Vec<Ssrc> {
        self.streams.keys().copied().collect()
    }

    /// observe_ssrc registers a newly-seen SSRC (optionally carrying a
    /// simulcast RID) and returns the `TrackRemote` identity surfaced to the
    /// application the first time this SSRC appears.
    pub fn observe_ssrc(&mut self, ssrc: Ssrc, track_id: &str, stream_id: &str, rid: Option<String>) -> &TrackRemote {
        let sender_ssrc = self.sender_ssrc;
        let kind = self.kind;
        let latency_ms = self.jitter_latency_ms;
        let clock_rate = self.clock_rate;
        let stream = self.streams.entry(ssrc).or_insert_with(|| Stream {
            jitter_buffer: JitterBuffer::new(latency_ms),
            nack_generator: NackGenerator::new(sender_ssrc, ssrc),
            report_recorder: ReceiverReportRecorder::new(ssrc, clock_rate),
            track: TrackRemote::new(track_id, stream_id, kind, rid),
        });
        &stream.track
    }

    /// insert feeds one inbound RTP packet through its SSRC's jitter buffer,
    /// NACK generator, and report recorder. Returns `(ordered_packets,
    /// should_arm_timer)`, mirroring `JitterBuffer::insert`.
    pub fn insert(
        &mut self,
        ssrc: Ssrc,
        packet: Packet,
        arrival: std::time::SystemTime,
    ) -> (Vec<Packet>, bool) {
        let Some(stream) = self.streams.get_mut(&ssrc) else {
            return (Vec::new(), false);
        };
        stream.nack_generator.add(packet.header.sequence_number);
        stream.report_recorder.record_packet(
            packet.header.sequence_number,
            packet.header.timestamp,
            arrival,
        );
        stream
            .jitter_buffer
            .insert(packet.header.sequence_number, packet)
    }

    pub fn on_timer(&mut self, ssrc: Ssrc) -> Vec<Packet> {
        match self.streams.get_mut(&ssrc) {
            Some(stream) => stream.jitter_buffer.on_timer(),
            None => Vec::new(),
        }
    }

    pub fn record_sender_report(&mut self, ssrc: Ssrc, ntp_time: u64, received_at: std::time::SystemTime) {
        if let Some(stream) = self.streams.get_mut(&ssrc) {
            stream.report_recorder.record_sender_report(ntp_time, received_at);
        }
    }

    pub fn get_nack_feedback(&mut self, ssrc: Ssrc) -> Option<rtcp::transport_feedbacks::transport_layer_nack::TransportLayerNack> {
        self.streams.get_mut(&ssrc)?.nack_generator.get_feedback()
    }

    pub fn get_report(
        &self,
        ssrc: Ssrc,
        now: std::time::SystemTime,
    ) -> Option<rtcp::receiver_report::ReceiverReport> {
        self.streams
            .get(&ssrc)
            .map(|stream| stream.report_recorder.get_report(self.sender_ssrc, now))
    }
}
