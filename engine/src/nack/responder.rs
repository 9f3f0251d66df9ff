use bytes::{BufMut, BytesMut};
use rtp::packet::Packet;

/// Number of most-recently-sent packets kept available for retransmission.
const RING_SIZE: usize = 200;

/// NackResponder keeps a ring of recently sent packets and answers NACK
/// feedback with RTX packets carrying the original sequence number prefixed
/// to the original payload.
pub struct NackResponder {
    rtx_ssrc: u32,
    rtx_payload_type: u8,
    ring: Vec<Option<Packet>>,
    next_rtx_sequence_number: u16,
}

impl NackResponder {
    pub fn new(rtx_ssrc: u32, rtx_payload_type: u8) -> Self {
        NackResponder {
            rtx_ssrc,
            rtx_payload_type,
            ring: vec![None; RING_SIZE],
            next_rtx_sequence_number: 0,
        }
    }

    /// record caches an outbound packet so it can be retransmitted later.
    pub fn record(&mut self, packet: Packet) {
        let idx = packet.header.sequence_number as usize % RING_SIZE;
        self.ring[idx] = Some(packet);
    }

    /// respond answers a list of NACK'd sequence numbers with RTX packets for
    /// whichever of them the ring still holds; sequence numbers no longer
    /// cached (overwritten by newer packets) are silently skipped.
    pub fn respond(&mut self, lost_seqs: &[u16]) -> Vec<Packet> {
        let mut rtx_packets = Vec::new();
        for &seq in lost_seqs {
            let idx = seq as usize % RING_SIZE;
            let Some(original) = &self.ring[idx] else {
                continue;
            };
            if original.header.sequence_number != seq {
                continue;
            }

            let mut payload = BytesMut::with_capacity(2 + original.payload.len());
            payload.put_u16(seq);
            payload.extend_from_slice(&original.payload);

            let mut header = original.header.clone();
            header.ssrc = self.rtx_ssrc;
            header.payload_type = self.rtx_payload_type;
            header.sequence_number = self.next_rtx_sequence_number;
            self.next_rtx_sequence_number = self.next_rtx_sequence_number.wrapping_add(1);

            rtx_packets.push(Packet {
                header,
                payload: payload.freeze(),
            });
        }
        rtx_packets
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;
    use rtp::header::Header;

    fn packet(sequence_number: u16, payload: &[u8]) -> Packet {
        Packet {
            header: Header {
                sequence_number,
                ..Default::default()
            },
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[test]
    fn test_responds_with_rtx_payload_prefixed_by_original_sequence_number() {
        // Scenario #6: sender transmits SSNs 100..110, receiver NACKs 105.
        let mut r = NackResponder::new(9999, 98);
        for seq in 100..111 {
            r.record(packet(seq, &[0xAB]));
        }

        let rtx = r.respond(&[105]);
        assert_eq!(rtx.len(), 1);
        assert_eq!(rtx[0].header.ssrc, 9999);
        assert_eq!(rtx[0].header.payload_type, 98);
        assert_eq!(&rtx[0].payload[..2], &[0x00, 0x69]);
        assert_eq!(&rtx[0].payload[2..], &[0xAB]);
    }

    #[test]
    fn test_overwritten_ring_slot_is_skipped() {
        let mut r = NackResponder::new(9999, 98);
        r.record(packet(1, &[1]));
        r.record(packet(1 + RING_SIZE as u16, &[2]));

        let rtx = r.respond(&[1]);
        assert!(rtx.is_empty());
    }

    #[test]
    fn test_rtx_sequence_numbers_strictly_increase() {
        let mut r = NackResponder::new(9999, 98);
        r.record(packet(1, &[1]));
        r.record(packet(2, &[2]));

        let rtx = r.respond(&[1, 2]);
        assert_eq!(rtx[0].header.sequence_number, 0);
        assert_eq!(rtx[1].header.sequence_number, 1);
    }
}
