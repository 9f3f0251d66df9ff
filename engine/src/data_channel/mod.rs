
use std::fmt;
use std::sync::Mutex;

use bytes::Bytes;
use data::message::message_channel_ack::DataChannelAck;
use data::message::message_channel_open::{ChannelType, DataChannelOpen};
use data::message::Message;
use util::marshal::{Marshal, Unmarshal};

pub use crate::sctp_transport::Reliability;
use crate::{Error, Result};

/// Payload protocol identifiers carried by the SCTP DATA chunk, per RFC 8832
/// §8 and RFC 8831 §8.
pub const PPID_DCEP: u32 = 50;
pub const PPID_STRING: u32 = 51;
pub const PPID_BINARY: u32 = 53;
pub const PPID_STRING_EMPTY: u32 = 56;
pub const PPID_BINARY_EMPTY: u32 = 57;

/// ppid_for_user_message picks the payload protocol identifier for a user
/// message, applying the SCTP zero-length-message workaround: an empty
/// message is tagged with a dedicated PPID instead of carrying zero bytes.
pub fn ppid_for_user_message(is_string: bool, payload_len: usize) -> u32 {
    match (is_string, payload_len) {
        (false, 0) => PPID_BINARY_EMPTY,
        (false, _) => PPID_BINARY,
        (true, 0) => PPID_STRING_EMPTY,
        (true, _) => PPID_STRING,
    }
}

/// DataChannelState is the lifecycle of one data channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DataChannelState {
    #[default]
    Connecting,
    Open,
    Closing,
    Closed,
}

const CONNECTING_STR: &str = "connecting";
const OPEN_STR: &str = "open";
const CLOSING_STR: &str = "closing";
const CLOSED_STR: &str = "closed";

impl fmt::Display for DataChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataChannelState::Connecting => CONNECTING_STR,
            DataChannelState::Open => OPEN_STR,
            DataChannelState::Closing => CLOSING_STR,
            DataChannelState::Closed => CLOSED_STR,
        };
        write!(f, "{s}")
    }
}

/// DataChannelParameters are the attributes negotiated at channel creation,
/// either by the application (opener) or parsed from an inbound
/// `DATA_CHANNEL_OPEN` message (acceptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChannelParameters {
    pub label: String,
    pub protocol: String,
    pub ordered: bool,
    pub reliability: Reliability,
    pub priority: u16,
    pub negotiated: bool,
}

impl Default for DataChannelParameters {
    fn default() -> Self {
        DataChannelParameters {
            label: String::new(),
            protocol: String::new(),
            ordered: true,
            reliability: Reliability::Reliable,
            priority: 256,
            negotiated: false,
        }
    }
}

fn channel_type_for(ordered: bool, reliability: Reliability) -> ChannelType {
    match (ordered, reliability) {
        (true, Reliability::Reliable) => ChannelType::Reliable,
        (false, Reliability::Reliable) => ChannelType::ReliableUnordered,
        (true, Reliability::MaxRetransmits(_)) => ChannelType::PartialReliableRexmit,
        (false, Reliability::MaxRetransmits(_)) => ChannelType::PartialReliableRexmitUnordered,
        (true, Reliability::MaxPacketLifetimeMs(_)) => ChannelType::PartialReliableTimed,
        (false, Reliability::MaxPacketLifetimeMs(_)) => ChannelType::PartialReliableTimedUnordered,
    }
}

fn reliability_parameter_for(reliability: Reliability) -> u32 {
    match reliability {
        Reliability::Reliable => 0,
        Reliability::MaxRetransmits(n) => n as u32,
        Reliability::MaxPacketLifetimeMs(t) => t as u32,
    }
}

fn reliability_from_channel_type(channel_type: ChannelType, reliability_parameter: u32) -> (bool, Reliability) {
    match channel_type {
        ChannelType::Reliable => (true, Reliability::Reliable),
        ChannelType::ReliableUnordered => (false, Reliability::Reliable),
        ChannelType::PartialReliableRexmit => (true, Reliability::MaxRetransmits(reliability_parameter as u16)),
        ChannelType::PartialReliableRexmitUnordered => {
            (false, Reliability::MaxRetransmits(reliability_parameter as u16))
        }
        ChannelType::PartialReliableTimed => {
            (true, Reliability::MaxPacketLifetimeMs(reliability_parameter as u16))
        }
        ChannelType::PartialReliableTimedUnordered => {
            (false, Reliability::MaxPacketLifetimeMs(reliability_parameter as u16))
        }
    }
}

/// DataChannel implements the DCEP open/ack handshake of RFC 8832 over a
/// caller-provided SCTP stream identifier; the SCTP association that
/// actually carries the bytes is an external collaborator (see
/// `crate::sctp_transport`).
#[derive(Debug)]
pub struct DataChannel {
    parameters: DataChannelParameters,
    stream_id: u16,
    state: Mutex<DataChannelState>,
}

impl DataChannel {
    /// new creates a channel the local application is opening. Its state is
    /// `connecting` until the peer's ACK arrives, unless `negotiated` is
    /// set, in which case no DCEP exchange happens and the channel opens
    /// immediately.
    pub fn new(parameters: DataChannelParameters, stream_id: u16) -> Self {
        let state = if parameters.negotiated {
            DataChannelState::Open
        } else {
            DataChannelState::Connecting
        };
        DataChannel {
            parameters,
            stream_id,
            state: Mutex::new(state),
        }
    }

    pub fn label(&self) -> &str {
        &self.parameters.label
    }

    pub fn protocol(&self) -> &str {
        &self.parameters.protocol
    }

    pub fn stream_id(&self) -> u16 {
        self.stream_id
    }

    pub fn negotiated(&self) -> bool {
        self.parameters.negotiated
    }

    pub fn reliability(&self) -> Reliability {
        self.parameters.reliability
    }

    pub fn ordered(&self) -> bool {
        self.parameters.ordered
    }

    pub fn state(&self) -> DataChannelState {
        *self.state.lock().unwrap()
    }

    /// open_message renders the `DATA_CHANNEL_OPEN` the opener sends on
    /// PPID 50 on its chosen stream.
    pub fn open_message(&self) -> Result<(u16, u32, Bytes)> {
        let msg = Message::DataChannelOpen(DataChannelOpen {
            channel_type: channel_type_for(self.parameters.ordered, self.parameters.reliability),
            priority: self.parameters.priority,
            reliability_parameter: reliability_parameter_for(self.parameters.reliability),
            label: self.parameters.label.clone().into_bytes(),
            protocol: self.parameters.protocol.clone().into_bytes(),
        });
        let bytes = msg.marshal().map_err(Error::Util)?;
        Ok((self.stream_id, PPID_DCEP, bytes))
    }

    /// handle_ack processes the peer's `DATA_CHANNEL_ACK`, which opens the
    /// channel on the opener's side.
    pub fn handle_ack(&self) {
        *self.state.lock().unwrap() = DataChannelState::Open;
    }

    pub fn close(&self) {
        *self.state.lock().unwrap() = DataChannelState::Closing;
    }

    pub fn finish_close(&self) {
        *self.state.lock().unwrap() = DataChannelState::Closed;
    }
}

/// handle_open parses an inbound `DATA_CHANNEL_OPEN`, allocating a channel
/// already `open` (the acceptor may send immediately), and renders the
/// `DATA_CHANNEL_ACK` to send back on the same stream.
pub fn handle_open(stream_id: u16, ppid: u32, bytes: &[u8]) -> Result<(DataChannel, (u16, u32, Bytes))> {
    if ppid != PPID_DCEP {
        return Err(Error::InvalidSdp(format!(
            "data channel open arrived on unexpected ppid {ppid}"
        )));
    }
    let mut buf = bytes;
    let msg = Message::unmarshal(&mut buf).map_err(Error::Util)?;
    let open = match msg {
        Message::DataChannelOpen(open) => open,
        Message::DataChannelAck(_) => {
            return Err(Error::InvalidSdp("expected DATA_CHANNEL_OPEN, got ACK".to_string()));
        }
    };
    log::debug!("received DATA_CHANNEL_OPEN for stream {stream_id}");

    let (ordered, reliability) = reliability_from_channel_type(open.channel_type, open.reliability_parameter);
    let parameters = DataChannelParameters {
        label: String::from_utf8_lossy(&open.label).into_owned(),
        protocol: String::from_utf8_lossy(&open.protocol).into_owned(),
        ordered,
        reliability,
        priority: open.priority,
        negotiated: false,
    };

    let channel = DataChannel::new(parameters, stream_id);
    *channel.state.lock().unwrap() = DataChannelState::Open;

    let ack = Message::DataChannelAck(DataChannelAck).marshal().map_err(Error::Util)?;
    Ok((channel, (stream_id, PPID_DCEP, ack)))
}
