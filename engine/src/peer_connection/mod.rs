mod connection_state;
#[cfg(test)]
mod peer_connection_test;

pub use connection_state::PeerConnectionState;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use rtcp::packet::Packet as RtcpPacket;
use rtcp::payload_feedbacks::picture_loss_indication::PictureLossIndication;
use rtp::packet::Packet;
use sdp::description::session::ATTR_KEY_MID;

use crate::api::media_engine::MediaEngine;
use crate::api::setting_engine::SettingEngine;
use crate::data_channel::{handle_open, DataChannel, DataChannelParameters};
use crate::demuxer::{Demuxer, Route};
use crate::rtp_transceiver::{
    negotiated_direction, Direction, RtpCodecType, RtpReceiver, RtpSender, RtpTransceiver,
};
use crate::sctp_transport::{SctpAssociation, SctpEvent};
use crate::sdp_translator::{
    self, direction_from_media, intersect_codecs, parse_remote_codecs, signaling_state,
    SdpType, SessionDescription, Side, SignalingState,
};
use crate::track::{TrackLocal, TrackRemote};
use crate::transport::{DtlsEvent, DtlsTransport, DtlsTransportState, IceConnectionState, IceEvent, IceGatheringState, IceTransport};
use crate::{Error, Result};

/// MID header extension id every m-line is built with; see
/// `sdp_translator::header_extensions_for`.
const MID_EXTENSION_ID: u8 = 1;

/// Event is a tagged message the PeerConnection surfaces to the application,
/// drained with `poll_event`.
#[derive(Debug)]
pub enum Event {
    IceCandidate(String),
    ConnectionStateChange(PeerConnectionState),
    IceGatheringStateChange(IceGatheringState),
    SignalingStateChange(SignalingState),
    Track(TrackRemote, String),
    Rtp(String, Option<String>, Packet),
    Rtcp(Vec<Box<dyn RtcpPacket + Send + Sync>>),
    DataChannel(Arc<DataChannel>),
    NegotiationNeeded,
    /// A jitter buffer started waiting on a gap and needs the caller to
    /// schedule `on_jitter_timer(track_id)` after `latency_ms` milliseconds,
    /// per the caller-owned-scheduler contract of `jitter_buffer::JitterBuffer`.
    ArmJitterTimer(String, u64),
}

/// PeerConnection is the top-level controller of §4.11: it owns the
/// transceivers, the negotiation state machine, the inbound packet
/// dispatcher, and the outbound stamping pipeline. Per §5 it is meant to be
/// driven as a single logical actor — callers serialize their calls into it
/// (directly, or via their own task) — so its state lives behind `Mutex`es
/// sized for that single-writer pattern rather than for heavy contention.
pub struct PeerConnection {
    media_engine: MediaEngine,
    setting_engine: SettingEngine,
    reporter_ssrc: u32,

    signaling_state: Mutex<SignalingState>,
    connection_state: Mutex<PeerConnectionState>,
    ice_gathering_state: Mutex<IceGatheringState>,
    ice_connection_state: Mutex<IceConnectionState>,
    dtls_state: Mutex<DtlsTransportState>,

    transceivers: Mutex<Vec<Arc<RtpTransceiver>>>,
    demuxer: Mutex<Demuxer>,

    local_description: Mutex<Option<SessionDescription>>,
    current_local_description: Mutex<Option<SessionDescription>>,
    remote_description: Mutex<Option<SessionDescription>>,

    ice_transport: Mutex<Option<Arc<dyn IceTransport>>>,
    dtls_transport: Mutex<Option<Arc<dyn DtlsTransport>>>,
    sctp_association: Mutex<Option<Arc<dyn SctpAssociation>>>,

    data_channels: Mutex<HashMap<u16, Arc<DataChannel>>>,
    pending_dcep_open: Mutex<Vec<u16>>,
    next_stream_id: AtomicU16,

    events: Mutex<VecDeque<Event>>,
    closed: Mutex<bool>,
}

impl PeerConnection {
    pub fn new(media_engine: MediaEngine, setting_engine: SettingEngine) -> Self {
        PeerConnection {
            media_engine,
            setting_engine,
            reporter_ssrc: rand::random(),
            signaling_state: Mutex::new(SignalingState::default()),
            connection_state: Mutex::new(PeerConnectionState::default()),
            ice_gathering_state: Mutex::new(IceGatheringState::default()),
            ice_connection_state: Mutex::new(IceConnectionState::default()),
            dtls_state: Mutex::new(DtlsTransportState::default()),
            transceivers: Mutex::new(Vec::new()),
            demuxer: Mutex::new(Demuxer::new()),
            local_description: Mutex::new(None),
            current_local_description: Mutex::new(None),
            remote_description: Mutex::new(None),
            ice_transport: Mutex::new(None),
            dtls_transport: Mutex::new(None),
            sctp_association: Mutex::new(None),
            data_channels: Mutex::new(HashMap::new()),
            pending_dcep_open: Mutex::new(Vec::new()),
            next_stream_id: AtomicU16::new(0),
            events: Mutex::new(VecDeque::new()),
            closed: Mutex::new(false),
        }
    }

    fn check_open(&self) -> Result<()> {
        if *self.closed.lock().unwrap() {
            return Err(Error::InvalidState("peer connection is closed".to_string()));
        }
        Ok(())
    }

    fn push_event(&self, event: Event) {
        self.events.lock().unwrap().push_back(event);
    }

    /// poll_event drains the next application-facing event, if any is
    /// queued.
    pub fn poll_event(&self) -> Option<Event> {
        self.events.lock().unwrap().pop_front()
    }

    pub fn signaling_state(&self) -> SignalingState {
        *self.signaling_state.lock().unwrap()
    }

    pub fn connection_state(&self) -> PeerConnectionState {
        *self.connection_state.lock().unwrap()
    }

    pub fn ice_gathering_state(&self) -> IceGatheringState {
        *self.ice_gathering_state.lock().unwrap()
    }

    pub fn ice_connection_state(&self) -> IceConnectionState {
        *self.ice_connection_state.lock().unwrap()
    }

    pub fn get_transceivers(&self) -> Vec<Arc<RtpTransceiver>> {
        self.transceivers.lock().unwrap().clone()
    }

    pub fn set_ice_transport(&self, transport: Arc<dyn IceTransport>) {
        *self.ice_transport.lock().unwrap() = Some(transport);
    }

    pub fn set_dtls_transport(&self, transport: Arc<dyn DtlsTransport>) {
        *self.dtls_transport.lock().unwrap() = Some(transport);
    }

    pub fn set_sctp_association(&self, association: Arc<dyn SctpAssociation>) {
        *self.sctp_association.lock().unwrap() = Some(association);
    }

    /// add_transceiver creates a new transceiver for `kind`, seeded with
    /// every codec the local MediaEngine has registered for it.
    pub fn add_transceiver(&self, kind: RtpCodecType, direction: Direction) -> Result<Arc<RtpTransceiver>> {
        self.check_open()?;
        let transceiver = Arc::new(RtpTransceiver::new(kind, direction));
        transceiver.set_codecs(self.media_engine.codecs(kind).to_vec());
        self.transceivers.lock().unwrap().push(transceiver.clone());
        self.push_event(Event::NegotiationNeeded);
        Ok(transceiver)
    }

    /// add_track reuses an existing sendable transceiver of the track's kind
    /// with no track of its own, or creates a fresh sendrecv one, per the
    /// W3C `addTrack` algorithm's transceiver-reuse step.
    pub fn add_track(&self, track: TrackLocal) -> Result<Arc<RtpTransceiver>> {
        self.check_open()?;
        let kind = track.kind();
        let reusable = self.transceivers.lock().unwrap().iter().find(|t| {
            t.kind() == kind
                && !t.stopped()
                && matches!(t.direction(), Direction::Sendrecv | Direction::Sendonly)
                && t.with_sender(|s| s.track().is_none()).unwrap_or(true)
        }).cloned();

        let transceiver = match reusable {
            Some(t) => t,
            None => self.add_transceiver(kind, Direction::Sendrecv)?,
        };

        let clock_rate = transceiver
            .codecs()
            .first()
            .map(|c| c.capability.clock_rate)
            .unwrap_or(0);
        let ssrc = rand::random();
        match transceiver.with_sender(|s| s.set_track(Some(track.clone()))) {
            Some(()) => {}
            None => transceiver.set_sender(RtpSender::new(ssrc, clock_rate, Some(track))),
        }
        self.push_event(Event::NegotiationNeeded);
        Ok(transceiver)
    }

    pub fn set_transceiver_direction(&self, mid: &str, direction: Direction) -> Result<()> {
        self.check_open()?;
        let transceivers = self.transceivers.lock().unwrap();
        let transceiver = transceivers
            .iter()
            .find(|t| t.mid().as_deref() == Some(mid))
            .ok_or_else(|| Error::InvalidState(format!("no transceiver with mid {mid}")))?;
        transceiver.set_direction(direction)?;
        drop(transceivers);
        self.push_event(Event::NegotiationNeeded);
        Ok(())
    }

    pub fn create_offer(&self) -> Result<SessionDescription> {
        self.check_open()?;
        sdp_translator::create_offer(&self.transceivers.lock().unwrap(), &self.setting_engine)
    }

    /// create_answer requires a remote offer already applied via
    /// `set_remote_description`.
    pub fn create_answer(&self) -> Result<SessionDescription> {
        self.check_open()?;
        let remote = self
            .remote_description
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::InvalidState("no remote description set".to_string()))?;
        let parsed = sdp_translator::parse(&remote.sdp)?;
        let result = sdp_translator::create_answer(
            &self.transceivers.lock().unwrap(),
            &parsed,
            &self.setting_engine,
        )?;
        self.transceivers
            .lock()
            .unwrap()
            .extend(result.created_transceivers);
        Ok(result.description)
    }

    pub fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        self.check_open()?;
        let next = signaling_state::transition(
            self.signaling_state(),
            Side::Local,
            description.sdp_type,
        )?;
        *self.signaling_state.lock().unwrap() = next;
        if next == SignalingState::Stable {
            *self.current_local_description.lock().unwrap() = Some(description.clone());
        }
        *self.local_description.lock().unwrap() = Some(description);
        self.sync_demuxer();
        log::info!("signaling state changed to {next:?}");
        self.push_event(Event::SignalingStateChange(next));
        Ok(())
    }

    pub fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.check_open()?;
        let next = signaling_state::transition(
            self.signaling_state(),
            Side::Remote,
            description.sdp_type,
        )?;
        let parsed = sdp_translator::parse(&description.sdp)?;
        if matches!(description.sdp_type, SdpType::Answer | SdpType::Pranswer) {
            self.apply_remote_answer(&parsed);
        }
        *self.signaling_state.lock().unwrap() = next;
        *self.remote_description.lock().unwrap() = Some(description);
        self.sync_demuxer();
        log::info!("signaling state changed to {next:?}");
        self.push_event(Event::SignalingStateChange(next));
        Ok(())
    }

    /// apply_remote_answer reconciles the offerer's transceivers against an
    /// answer: match by MID, intersect codecs, and negotiate direction per
    /// the W3C table.
    fn apply_remote_answer(&self, parsed: &sdp::SessionDescription) {
        let transceivers = self.transceivers.lock().unwrap();
        for media in &parsed.media_descriptions {
            let Some(mid) = media.attribute(ATTR_KEY_MID).flatten() else {
                continue;
            };
            let Some(transceiver) = transceivers.iter().find(|t| t.mid().as_deref() == Some(mid)) else {
                continue;
            };

            let remote_codecs = parse_remote_codecs(media);
            let local_codecs = transceiver.codecs();
            let intersection = intersect_codecs(&local_codecs, &remote_codecs);
            let remote_direction = direction_from_media(media);
            let negotiated = negotiated_direction(transceiver.direction(), remote_direction);

            if intersection.is_empty() {
                transceiver.set_current_direction(Direction::Inactive);
            } else {
                transceiver.set_codecs(intersection);
                transceiver.set_current_direction(negotiated);
            }
        }
    }

    /// sync_demuxer registers every negotiated transceiver's MID and payload
    /// types so inbound packets can be routed by the demuxer.
    fn sync_demuxer(&self) {
        let transceivers = self.transceivers.lock().unwrap();
        let mut demuxer = self.demuxer.lock().unwrap();
        for transceiver in transceivers.iter() {
            if let Some(mid) = transceiver.mid() {
                let payload_types: Vec<u8> = transceiver
                    .codecs()
                    .iter()
                    .map(|c| c.payload_type)
                    .collect();
                demuxer.register_mid(&mid, &payload_types);
            }
        }
    }

    pub fn get_local_description(&self) -> Option<SessionDescription> {
        self.local_description.lock().unwrap().clone()
    }

    pub fn get_current_local_description(&self) -> Option<SessionDescription> {
        self.current_local_description.lock().unwrap().clone()
    }

    pub fn get_remote_description(&self) -> Option<SessionDescription> {
        self.remote_description.lock().unwrap().clone()
    }

    pub fn add_ice_candidate(&self, candidate: &str) -> Result<()> {
        self.check_open()?;
        let ice = self.ice_transport.lock().unwrap().clone();
        match ice {
            Some(ice) => ice.add_remote_candidate(candidate),
            None => Err(Error::InvalidState("no ice transport attached".to_string())),
        }
    }

    /// handle_ice_event updates gathering/connection state from the ICE
    /// transport's event stream and recomputes `connection_state`.
    pub fn handle_ice_event(&self, event: IceEvent) {
        match event {
            IceEvent::GatheringStateChange(state) => {
                *self.ice_gathering_state.lock().unwrap() = state;
                self.push_event(Event::IceGatheringStateChange(state));
            }
            IceEvent::ConnectionStateChange(state) => {
                *self.ice_connection_state.lock().unwrap() = state;
                self.recompute_connection_state();
            }
            IceEvent::Candidate(candidate) => {
                self.push_event(Event::IceCandidate(candidate));
            }
            IceEvent::Data(_) => {}
        }
    }

    /// handle_dtls_event updates the DTLS transport's state and recomputes
    /// `connection_state`.
    pub fn handle_dtls_event(&self, event: DtlsEvent) {
        match event {
            DtlsEvent::StateChange(state) => {
                *self.dtls_state.lock().unwrap() = state;
                self.recompute_connection_state();
            }
            DtlsEvent::Rx(_) | DtlsEvent::FingerprintReady(_) => {}
        }
    }

    fn recompute_connection_state(&self) {
        let next = connection_state::from_transports(
            self.ice_connection_state(),
            *self.dtls_state.lock().unwrap(),
        );
        let changed = *self.connection_state.lock().unwrap() != next;
        *self.connection_state.lock().unwrap() = next;
        if changed {
            log::info!("peer connection state changed: {next}");
            self.push_event(Event::ConnectionStateChange(next));
        }
    }

    /// handle_rtp routes one already SRTP-decrypted inbound RTP packet
    /// through the demuxer into its transceiver's receiver.
    pub fn handle_rtp(&self, packet: Packet) -> Result<()> {
        self.check_open()?;
        let ssrc = packet.header.ssrc;
        let sequence_number = packet.header.sequence_number;
        let payload_type = packet.header.payload_type;
        let mid_extension = packet
            .header
            .get_extension(MID_EXTENSION_ID)
            .and_then(|b| std::str::from_utf8(b).ok());

        let route = self
            .demuxer
            .lock()
            .unwrap()
            .route(ssrc, sequence_number, mid_extension, payload_type);
        let Route::Bound(mid) = route else {
            return Ok(());
        };

        let transceivers = self.transceivers.lock().unwrap();
        let Some(transceiver) = transceivers.iter().find(|t| t.mid().as_deref() == Some(mid.as_str())) else {
            return Ok(());
        };

        if transceiver.with_receiver(|_| ()).is_none() {
            let clock_rate = transceiver
                .codecs()
                .iter()
                .find(|c| c.payload_type == payload_type)
                .map(|c| c.capability.clock_rate)
                .unwrap_or(0);
            transceiver.set_receiver(RtpReceiver::new(
                transceiver.kind(),
                clock_rate,
                self.setting_engine.jitter_buffer_latency_ms(),
                self.reporter_ssrc,
            ));
        }

        let now = SystemTime::now();
        let mut to_surface = Vec::new();
        let mut track_for_event = None;
        let mut should_arm = false;
        transceiver.with_receiver(|receiver| {
            let is_new = !receiver.ssrcs().contains(&ssrc);
            let track = receiver
                .observe_ssrc(ssrc, &ssrc.to_string(), &ssrc.to_string(), None)
                .clone();
            if is_new {
                track_for_event = Some(track.clone());
            }
            let (emitted, arm) = receiver.insert(ssrc, packet, now);
            should_arm = arm;
            to_surface = emitted
                .into_iter()
                .map(|p| (track.id().to_string(), track.rid().map(str::to_string), p))
                .collect::<Vec<_>>();
        });
        drop(transceivers);

        if let Some(track) = track_for_event {
            self.push_event(Event::Track(track, mid));
        }
        for (track_id, rid, packet) in to_surface {
            self.push_event(Event::Rtp(track_id, rid, packet));
        }
        if should_arm {
            self.push_event(Event::ArmJitterTimer(
                ssrc.to_string(),
                self.setting_engine.jitter_buffer_latency_ms(),
            ));
        }
        Ok(())
    }

    /// on_jitter_timer drains whatever contiguous prefix is now available for
    /// the track named by `track_id` (its SSRC's decimal string), in response
    /// to an `Event::ArmJitterTimer` the caller scheduled earlier.
    pub fn on_jitter_timer(&self, track_id: &str) -> Result<()> {
        self.check_open()?;
        let ssrc: u32 = track_id
            .parse()
            .map_err(|_| Error::UnknownTrack(track_id.to_string()))?;

        let transceivers = self.transceivers.lock().unwrap();
        let mut emitted = Vec::new();
        for transceiver in transceivers.iter() {
            let found = transceiver.with_receiver(|r| {
                if r.ssrcs().contains(&ssrc) {
                    Some(r.on_timer(ssrc))
                } else {
                    None
                }
            });
            if let Some(Some(packets)) = found {
                emitted = packets;
                break;
            }
        }
        drop(transceivers);

        for packet in emitted {
            self.push_event(Event::Rtp(track_id.to_string(), None, packet));
        }
        Ok(())
    }

    /// handle_rtcp parses an inbound RTCP compound packet, folds sender
    /// reports into the matching receiver's recorder, answers NACKs with
    /// cached RTX packets, and surfaces the packets to the application.
    /// Returns any RTX packets the caller should transmit.
    pub fn handle_rtcp(&self, bytes: &[u8]) -> Result<Vec<Packet>> {
        self.check_open()?;
        let mut buf = bytes;
        let packets = match rtcp::packet::unmarshal(&mut buf) {
            Ok(packets) => packets,
            Err(err) => {
                log::debug!("dropping malformed rtcp packet: {err}");
                return Ok(Vec::new());
            }
        };

        let mut rtx_out = Vec::new();
        let transceivers = self.transceivers.lock().unwrap();
        for packet in &packets {
            if let Some(sr) = packet
                .as_any()
                .downcast_ref::<rtcp::sender_report::SenderReport>()
            {
                for transceiver in transceivers.iter() {
                    transceiver.with_receiver(|r| {
                        if r.ssrcs().contains(&sr.ssrc) {
                            r.record_sender_report(sr.ssrc, sr.ntp_time, SystemTime::now());
                        }
                    });
                }
            } else if let Some(nack) = packet
                .as_any()
                .downcast_ref::<rtcp::transport_feedbacks::transport_layer_nack::TransportLayerNack>()
            {
                for transceiver in transceivers.iter() {
                    let rtx = transceiver.with_sender(|s| {
                        if s.ssrc() == nack.media_ssrc || s.rtx_ssrc() == Some(nack.media_ssrc) {
                            let seqs: Vec<u16> =
                                nack.nacks.iter().flat_map(|p| p.packet_list()).collect();
                            Some(s.on_nack(&seqs))
                        } else {
                            None
                        }
                    });
                    if let Some(Some(packets)) = rtx {
                        rtx_out.extend(packets);
                    }
                }
            }
        }
        drop(transceivers);

        self.push_event(Event::Rtcp(packets));
        Ok(rtx_out)
    }

    /// send_rtp stamps `packet` with the sending transceiver's SSRC and next
    /// sequence number, attaching the MID extension until the remote has
    /// confirmed the MID/SSRC binding, and returns the stamped packet for
    /// the caller to encrypt and transmit.
    pub fn send_rtp(&self, track_id: &str, mut packet: Packet) -> Result<Packet> {
        self.check_open()?;
        let transceivers = self.transceivers.lock().unwrap();
        let transceiver = transceivers
            .iter()
            .find(|t| {
                t.with_sender(|s| s.track().map(|t| t.id().to_string()))
                    .flatten()
                    .as_deref()
                    == Some(track_id)
            })
            .ok_or_else(|| Error::UnknownTrack(track_id.to_string()))?;

        if transceiver.codecs().is_empty() {
            return Err(Error::NoCodecNegotiated);
        }

        let unconfirmed = transceiver.current_direction() == Direction::Unspecified;
        let mid = transceiver.mid();
        transceiver.with_sender(|sender| {
            packet.header.ssrc = sender.ssrc();
            packet.header.sequence_number = sender.next_sequence_number();
            if unconfirmed {
                if let Some(mid) = &mid {
                    packet.header.set_extension(MID_EXTENSION_ID, mid.as_bytes()).ok();
                }
            }
            sender.on_send(&packet, SystemTime::now());
        });
        drop(transceivers);

        Ok(packet)
    }

    /// send_pli builds a Picture Loss Indication for the receiver holding
    /// `track_id`. Inbound tracks are identified by their SSRC's decimal
    /// string, so `track_id` is parsed back into the SSRC it names.
    pub fn send_pli(&self, track_id: &str) -> Result<PictureLossIndication> {
        self.check_open()?;
        let ssrc: u32 = track_id
            .parse()
            .map_err(|_| Error::UnknownTrack(track_id.to_string()))?;
        let known = self
            .transceivers
            .lock()
            .unwrap()
            .iter()
            .any(|t| t.with_receiver(|r| r.ssrcs().contains(&ssrc)).unwrap_or(false));
        if !known {
            return Err(Error::UnknownTrack(track_id.to_string()));
        }
        Ok(PictureLossIndication {
            sender_ssrc: self.reporter_ssrc,
            media_ssrc: ssrc,
        })
    }

    /// create_data_channel allocates a new outbound data channel and, if an
    /// SCTP association is attached, asks it to open the underlying stream;
    /// the DCEP `DATA_CHANNEL_OPEN` is sent once `handle_sctp_event` reports
    /// that stream as open.
    pub fn create_data_channel(&self, label: &str, mut parameters: DataChannelParameters) -> Result<Arc<DataChannel>> {
        self.check_open()?;
        parameters.label = label.to_string();
        let sid = self.next_stream_id.fetch_add(2, Ordering::SeqCst);
        let channel = Arc::new(DataChannel::new(parameters.clone(), sid));
        self.data_channels.lock().unwrap().insert(sid, channel.clone());

        if let Some(association) = self.sctp_association.lock().unwrap().clone() {
            association.open_stream(sid, parameters.reliability, parameters.ordered)?;
            if !parameters.negotiated {
                self.pending_dcep_open.lock().unwrap().push(sid);
            }
        }
        Ok(channel)
    }

    /// handle_sctp_event drives the DCEP open/ack handshake and surfaces
    /// remotely-initiated data channels to the application.
    pub fn handle_sctp_event(&self, event: SctpEvent) -> Result<()> {
        match event {
            SctpEvent::Opened(sid) => {
                let mut pending = self.pending_dcep_open.lock().unwrap();
                if let Some(pos) = pending.iter().position(|&s| s == sid) {
                    pending.remove(pos);
                    if let Some(channel) = self.data_channels.lock().unwrap().get(&sid).cloned() {
                        let (sid, ppid, bytes) = channel.open_message()?;
                        if let Some(association) = self.sctp_association.lock().unwrap().clone() {
                            association.send(sid, ppid, bytes)?;
                        }
                    }
                }
            }
            SctpEvent::Rx(sid, ppid, bytes) => {
                if ppid == crate::data_channel::PPID_DCEP {
                    let existing = self.data_channels.lock().unwrap().get(&sid).cloned();
                    if let Some(channel) = existing {
                        channel.handle_ack();
                    } else {
                        let (channel, (ack_sid, ack_ppid, ack_bytes)) =
                            handle_open(sid, ppid, &bytes)?;
                        let channel = Arc::new(channel);
                        self.data_channels.lock().unwrap().insert(sid, channel.clone());
                        if let Some(association) = self.sctp_association.lock().unwrap().clone() {
                            association.send(ack_sid, ack_ppid, ack_bytes)?;
                        }
                        log::debug!("data channel {sid} opened by remote peer");
                        self.push_event(Event::DataChannel(channel));
                    }
                }
            }
            SctpEvent::Closed(sid) => {
                if let Some(channel) = self.data_channels.lock().unwrap().get(&sid).cloned() {
                    channel.finish_close();
                }
            }
        }
        Ok(())
    }

    /// close transitions to the terminal state, drops every queued event in
    /// favor of a final state-change pair, and makes every subsequent
    /// operation fail with `InvalidState`.
    pub fn close(&self) -> Result<()> {
        self.check_open()?;
        *self.closed.lock().unwrap() = true;
        *self.signaling_state.lock().unwrap() = SignalingState::Closed;
        *self.connection_state.lock().unwrap() = PeerConnectionState::Closed;
        for transceiver in self.transceivers.lock().unwrap().iter() {
            transceiver.stop();
        }
        self.events.lock().unwrap().clear();
        self.push_event(Event::SignalingStateChange(SignalingState::Closed));
        self.push_event(Event::ConnectionStateChange(PeerConnectionState::Closed));
        if let Some(ice) = self.ice_transport.lock().unwrap().clone() {
            ice.close()?;
        }
        if let Some(dtls) = self.dtls_transport.lock().unwrap().clone() {
            dtls.close()?;
        }
        Ok(())
    }
}
