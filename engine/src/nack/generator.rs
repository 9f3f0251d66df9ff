use std::collections::BTreeMap;

use rtcp::transport_feedbacks::transport_layer_nack::{NackPair, TransportLayerNack};

/// Default number of NACK feedbacks issued for one lost sequence number
/// before the receiver gives up on it.
const DEFAULT_MAX_NACK: u8 = 3;

/// NackGenerator tracks one receiver SSRC's sequence numbers and produces
/// RTCP Transport-Layer NACK feedback for gaps it has observed.
pub struct NackGenerator {
    max_nack: u8,
    sender_ssrc: u32,
    media_ssrc: u32,
    last_seq: Option<u16>,
    lost: BTreeMap<u16, u8>,
}

impl NackGenerator {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        Self::with_max_nack(sender_ssrc, media_ssrc, DEFAULT_MAX_NACK)
    }

    pub fn with_max_nack(sender_ssrc: u32, media_ssrc: u32, max_nack: u8) -> Self {
        NackGenerator {
            max_nack,
            sender_ssrc,
            media_ssrc,
            last_seq: None,
            lost: BTreeMap::new(),
        }
    }

    /// add records one received sequence number, marking the gap since the
    /// last in-order packet as lost, or clearing a previously-lost entry when
    /// a retransmission arrives out of order.
    pub fn add(&mut self, seq: u16) {
        let last = match self.last_seq {
            None => {
                self.last_seq = Some(seq);
                return;
            }
            Some(last) => last,
        };

        let delta = seq.wrapping_sub(last) as i16;
        if delta > 0 {
            let mut s = last.wrapping_add(1);
            while s != seq {
                self.lost.insert(s, self.max_nack);
                s = s.wrapping_add(1);
            }
            self.last_seq = Some(seq);
        } else if delta < 0 {
            self.lost.remove(&seq);
        }
    }

    /// get_feedback emits one NACK listing every currently-lost sequence
    /// number, then decrements each entry's remaining count, evicting any
    /// that reach zero. Returns `None` when nothing is outstanding.
    pub fn get_feedback(&mut self) -> Option<TransportLayerNack> {
        if self.lost.is_empty() {
            return None;
        }

        let seqs: Vec<u16> = self.lost.keys().copied().collect();
        let nacks = nack_pairs_from_seqs(&seqs);

        let mut expired = Vec::new();
        for (seq, remaining) in self.lost.iter_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                expired.push(*seq);
            }
        }
        for seq in expired {
            self.lost.remove(&seq);
        }

        Some(TransportLayerNack {
            sender_ssrc: self.sender_ssrc,
            media_ssrc: self.media_ssrc,
            nacks,
        })
    }
}

/// nack_pairs_from_seqs groups a sorted run of lost sequence numbers into
/// `NackPair`s, packing up to 16 trailing losses into each pair's bitmask.
fn nack_pairs_from_seqs(seqs: &[u16]) -> Vec<NackPair> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < seqs.len() {
        let packet_id = seqs[i];
        let mut lost_packets: u16 = 0;
        let mut j = i + 1;
        while j < seqs.len() {
            let diff = seqs[j].wrapping_sub(packet_id);
            if diff == 0 || diff > 16 {
                break;
            }
            lost_packets |= 1 << (diff - 1);
            j += 1;
        }
        pairs.push(NackPair {
            packet_id,
            lost_packets,
        });
        i = j;
    }
    pairs
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_in_order_packets_generate_no_feedback() {
        let mut g = NackGenerator::new(1, 2);
        for seq in 100..105 {
            g.add(seq);
        }
        assert!(g.get_feedback().is_none());
    }

    #[test]
    fn test_gap_is_reported_until_max_nack_exhausted() {
        let mut g = NackGenerator::with_max_nack(1, 2, 2);
        g.add(100);
        g.add(102); // 101 is lost

        let fb = g.get_feedback().expect("one lost seq");
        assert_eq!(fb.nacks[0].packet_list(), vec![101]);

        let fb = g.get_feedback().expect("still outstanding");
        assert_eq!(fb.nacks[0].packet_list(), vec![101]);

        // The entry's remaining count hit zero on the second call.
        assert!(g.get_feedback().is_none());
    }

    #[test]
    fn test_late_arrival_clears_lost_entry() {
        let mut g = NackGenerator::new(1, 2);
        g.add(100);
        g.add(102);
        g.add(101); // retransmission arrives out of order

        assert!(g.get_feedback().is_none());
    }

    #[test]
    fn test_multiple_losses_pack_into_one_pair() {
        let mut g = NackGenerator::new(1, 2);
        g.add(100);
        g.add(105); // 101..104 lost

        let fb = g.get_feedback().unwrap();
        assert_eq!(fb.nacks.len(), 1);
        assert_eq!(fb.nacks[0].packet_list(), vec![101, 102, 103, 104]);
    }
}
