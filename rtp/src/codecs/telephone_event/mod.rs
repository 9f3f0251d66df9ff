#[cfg(test)]
mod telephone_event_test;

use bytes::{Bytes, BytesMut, BufMut};

use crate::error::{Error, Result};
use crate::packetizer::{Depacketizer, Payloader};

/// Size in bytes of an RFC 4733 telephone-event payload.
pub const TELEPHONE_EVENT_SIZE: usize = 4;

/// TelephoneEventPayloader passes a pre-built RFC 4733 event payload through
/// unchanged; a single event never spans more than one RTP packet.
#[derive(Default, Debug, Copy, Clone)]
pub struct TelephoneEventPayloader;

impl Payloader for TelephoneEventPayloader {
    fn payload(&mut self, mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() || mtu == 0 {
            return Ok(vec![]);
        }
        if payload.len() != TELEPHONE_EVENT_SIZE {
            return Err(Error::ErrShortPacket);
        }

        Ok(vec![payload.clone()])
    }

    fn clone_to(&self) -> Box<dyn Payloader + Send + Sync> {
        Box::new(*self)
    }
}

/// TelephoneEventPacket represents an RFC 4733 DTMF event carried as the
/// payload of an RTP packet.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     event     |E|R| volume  |          duration             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(PartialEq, Eq, Debug, Default, Clone, Copy)]
pub struct TelephoneEventPacket {
    pub event: u8,
    pub end_of_event: bool,
    pub volume: u8,
    pub duration: u16,
}

impl TelephoneEventPacket {
    /// digit maps the event code to the DTMF digit it represents, per
    /// RFC 4733 section 3.2. Events above 15 (comfort-noise/tone events)
    /// have no digit representation.
    pub fn digit(&self) -> Option<char> {
        match self.event {
            0..=9 => char::from_digit(self.event as u32, 10),
            10 => Some('*'),
            11 => Some('#'),
            12 => Some('A'),
            13 => Some('B'),
            14 => Some('C'),
            15 => Some('D'),
            _ => None,
        }
    }
}

impl Depacketizer for TelephoneEventPacket {
    fn depacketize(&mut self, packet: &Bytes) -> Result<Bytes> {
        if packet.len() < TELEPHONE_EVENT_SIZE {
            return Err(Error::ErrShortPacket);
        }

        self.event = packet[0];
        self.end_of_event = (packet[1] & 0x80) != 0;
        self.volume = packet[1] & 0x3F;
        self.duration = u16::from_be_bytes([packet[2], packet[3]]);

        let mut out = BytesMut::with_capacity(TELEPHONE_EVENT_SIZE);
        out.put_u8(self.event);
        out.put_u8(if self.end_of_event {
            0x80 | self.volume
        } else {
            self.volume
        });
        out.put_u16(self.duration);

        Ok(out.freeze())
    }

    /// Every telephone-event packet stands alone; there is no fragmentation.
    fn is_partition_head(&self, _payload: &Bytes) -> bool {
        true
    }

    /// The final packet of an event repeats the payload with the marker bit
    /// and end-of-event bit set; callers should use the marker together
    /// with a strictly increasing timestamp to detect a new event rather
    /// than relying on is_partition_tail alone.
    fn is_partition_tail(&self, marker: bool, _payload: &Bytes) -> bool {
        marker
    }
}

/// Encodes an event as a 4-byte RFC 4733 payload suitable for Payloader::payload.
pub fn marshal_event(event: u8, end_of_event: bool, volume: u8, duration: u16) -> Bytes {
    let mut out = BytesMut::with_capacity(TELEPHONE_EVENT_SIZE);
    out.put_u8(event);
    out.put_u8(if end_of_event { 0x80 | (volume & 0x3F) } else { volume & 0x3F });
    out.put_u16(duration);
    out.freeze()
}
