#[cfg(test)]
mod demuxer_test;

use std::collections::HashMap;

/// Outcome of routing one inbound RTP packet to a MID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The packet was bound (or re-bound) to this MID.
    Bound(String),
    /// No MID extension, payload-type table, or SSRC cache entry matched.
    Unmatched,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    last_sequence_number: u16,
}

/// Demuxer routes inbound RTP packets to a transceiver's MID using the MID
/// header extension, the payload-type table, and an SSRC cache.
///
/// The cache never forgets a binding on a sequence-number regression: a
/// packet with a lower extension sequence number than the one already
/// recorded for its SSRC can never change the cached MID.
#[derive(Debug, Default)]
pub struct Demuxer {
    mid_to_payload_types: HashMap<String, Vec<u8>>,
    payload_type_to_mid: HashMap<u8, String>,
    ssrc_cache: HashMap<u32, (String, CacheEntry)>,
}

impl Demuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// register_mid associates a MID with the set of payload types it may
    /// carry. A payload type that maps to more than one MID is ambiguous and
    /// is not usable to bind a fresh SSRC.
    pub fn register_mid(&mut self, mid: &str, payload_types: &[u8]) {
        self.mid_to_payload_types
            .insert(mid.to_string(), payload_types.to_vec());
        for &pt in payload_types {
            self.payload_type_to_mid
                .entry(pt)
                .and_modify(|existing| {
                    if existing != mid {
                        // Payload type now maps to more than one MID; mark
                        // it ambiguous by clearing the entry's usefulness.
                        existing.clear();
                    }
                })
                .or_insert_with(|| mid.to_string());
        }
    }

    /// route processes one inbound packet. `mid_extension` is the value of
    /// the MID RTP header extension if present (as (mid, extension_seq)),
    /// decoded by the caller from the raw extension bytes and the packet's
    /// own RTP sequence number, which doubles as the extension's ordering
    /// key per §4.2.
    pub fn route(
        &mut self,
        ssrc: u32,
        sequence_number: u16,
        mid_extension: Option<&str>,
        payload_type: u8,
    ) -> Route {
        if let Some(mid) = mid_extension {
            let should_bind = match self.ssrc_cache.get(&ssrc) {
                Some((_, cached)) => {
                    !sequence_number_regressed(cached.last_sequence_number, sequence_number)
                }
                None => true,
            };
            if should_bind {
                self.ssrc_cache.insert(
                    ssrc,
                    (
                        mid.to_string(),
                        CacheEntry {
                            last_sequence_number: sequence_number,
                        },
                    ),
                );
                return Route::Bound(mid.to_string());
            }
            if let Some((cached_mid, _)) = self.ssrc_cache.get(&ssrc) {
                return Route::Bound(cached_mid.clone());
            }
        }

        if let Some((mid, _)) = self.ssrc_cache.get(&ssrc) {
            return Route::Bound(mid.clone());
        }

        if let Some(mid) = self.payload_type_to_mid.get(&payload_type) {
            if !mid.is_empty() {
                self.ssrc_cache.insert(
                    ssrc,
                    (
                        mid.clone(),
                        CacheEntry {
                            last_sequence_number: sequence_number,
                        },
                    ),
                );
                return Route::Bound(mid.clone());
            }
        }

        Route::Unmatched
    }
}

/// sequence_number_regressed compares two 16-bit extension sequence numbers
/// under RFC 3550-style wraparound: `new` regressed relative to `cached` when
/// the signed 16-bit delta `new - cached` is negative.
fn sequence_number_regressed(cached: u16, new: u16) -> bool {
    (new.wrapping_sub(cached) as i16) < 0
}
