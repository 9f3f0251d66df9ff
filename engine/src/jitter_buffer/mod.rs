
use std::collections::BTreeMap;

use rtp::packet::Packet;

/// TimerState mirrors the buffer's three-state arming model: it starts
/// waiting out the initial latency window, then alternates between having
/// no outstanding timer and having one armed over a sequence gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    InitialWait,
    TimerNotSet,
    TimerSet,
}

/// JitterBuffer reorders a single SSRC's RTP packets and compensates for
/// loss by emitting a contiguous prefix either immediately or after a
/// `latency_ms` timeout, whichever comes first. Sequence numbers are
/// extended to 32 bits internally so 16-bit wraparound never ambiguates
/// ordering within one buffering window.
pub struct JitterBuffer {
    latency_ms: u64,
    state: Option<TimerState>,
    store: BTreeMap<u32, Packet>,
    flush_index: i64,
    highest_incoming_index: i64,
    cycles: u32,
    last_sequence_number: Option<u16>,
}

impl JitterBuffer {
    pub fn new(latency_ms: u64) -> Self {
        JitterBuffer {
            latency_ms,
            state: None,
            store: BTreeMap::new(),
            flush_index: -1,
            highest_incoming_index: -1,
            cycles: 0,
            last_sequence_number: None,
        }
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    fn extend(&mut self, sequence_number: u16) -> u32 {
        if let Some(last) = self.last_sequence_number {
            let delta = sequence_number as i32 - last as i32;
            if delta < -0x7FFF {
                self.cycles = self.cycles.wrapping_add(1);
            } else if delta > 0x7FFF {
                self.cycles = self.cycles.wrapping_sub(1);
            }
        }
        self.last_sequence_number = Some(sequence_number);
        ((self.cycles as u32) << 16) | sequence_number as u32
    }

    /// insert returns `(emitted_packets, should_arm_timer)`. The caller owns
    /// the scheduler: when `should_arm_timer` is true, arm a one-shot timer
    /// for `latency_ms` that calls `on_timer`.
    pub fn insert(&mut self, sequence_number: u16, packet: Packet) -> (Vec<Packet>, bool) {
        let extended = self.extend(sequence_number);

        if self.state.is_none() {
            self.state = Some(TimerState::InitialWait);
            self.store.insert(extended, packet);
            self.highest_incoming_index = extended as i64;
            return (Vec::new(), true);
        }

        if self.state == Some(TimerState::InitialWait) {
            self.store.insert(extended, packet);
            if extended as i64 > self.highest_incoming_index {
                self.highest_incoming_index = extended as i64;
            }
            return (Vec::new(), false);
        }

        if (extended as i64) <= self.flush_index {
            return (Vec::new(), false);
        }

        self.store.insert(extended, packet);
        if extended as i64 > self.highest_incoming_index {
            self.highest_incoming_index = extended as i64;
        }

        if extended as i64 == self.flush_index + 1 {
            let emitted = self.drain_contiguous();
            return (emitted, false);
        }

        let mut arm = false;
        if self.state != Some(TimerState::TimerSet) {
            self.state = Some(TimerState::TimerSet);
            arm = true;
        }
        (Vec::new(), arm)
    }

    /// on_timer is invoked by the caller's scheduler when the armed timer
    /// fires. In `InitialWait`, this just starts normal operation and
    /// drains whatever continuous prefix is already available. Otherwise it
    /// jumps the flush index past the gap and emits what's now contiguous.
    pub fn on_timer(&mut self) -> Vec<Packet> {
        match self.state {
            Some(TimerState::InitialWait) => {
                self.state = Some(TimerState::TimerNotSet);
                self.drain_contiguous()
            }
            _ => {
                self.state = Some(TimerState::TimerNotSet);
                if let Some((&next, _)) = self.store.range((self.flush_index + 1) as u32..).next()
                {
                    self.flush_index = next as i64 - 1;
                }
                self.drain_contiguous()
            }
        }
    }

    /// flush drains every buffered packet regardless of contiguity and
    /// resets the store.
    pub fn flush(&mut self) -> Vec<Packet> {
        let emitted: Vec<Packet> = std::mem::take(&mut self.store).into_values().collect();
        self.flush_index = self.highest_incoming_index;
        self.state = Some(TimerState::TimerNotSet);
        emitted
    }

    fn drain_contiguous(&mut self) -> Vec<Packet> {
        let mut emitted = Vec::new();
        loop {
            let next = (self.flush_index + 1) as u32;
            match self.store.remove(&next) {
                Some(packet) => {
                    emitted.push(packet);
                    self.flush_index += 1;
                }
                None => break,
            }
        }
        emitted
    }

    pub fn flush_index(&self) -> i64 {
        self.flush_index
    }
}
