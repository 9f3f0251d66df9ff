
/// Default jitter buffer latency, matching the window over which an
/// out-of-order video packet is still expected to arrive before emission.
const DEFAULT_JITTER_BUFFER_LATENCY_MS: u64 = 10;

/// Default number of NACK feedbacks issued per lost sequence number.
const DEFAULT_MAX_NACK: u8 = 3;

/// Default size of the sender's RTX retransmission ring.
const DEFAULT_RTX_RING_SIZE: usize = 200;

/// SettingEngine allows influencing engine behavior in ways not exposed by
/// the PeerConnection API itself. A SettingEngine may be shared across many
/// PeerConnections built from the same API.
#[derive(Debug, Clone)]
pub struct SettingEngine {
    pub(crate) jitter_buffer_latency_ms: u64,
    pub(crate) max_nack: u8,
    pub(crate) rtx_ring_size: usize,
    pub(crate) bundle_policy: BundlePolicy,
}

impl Default for SettingEngine {
    fn default() -> Self {
        SettingEngine {
            jitter_buffer_latency_ms: DEFAULT_JITTER_BUFFER_LATENCY_MS,
            max_nack: DEFAULT_MAX_NACK,
            rtx_ring_size: DEFAULT_RTX_RING_SIZE,
            bundle_policy: BundlePolicy::default(),
        }
    }
}

/// BundlePolicy controls whether m-lines share one transport (the only mode
/// this engine implements) or are kept logically distinct for negotiation
/// purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundlePolicy {
    #[default]
    MaxBundle,
    Balanced,
}

impl SettingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_jitter_buffer_latency(&mut self, latency_ms: u64) {
        self.jitter_buffer_latency_ms = latency_ms;
    }

    pub fn jitter_buffer_latency_ms(&self) -> u64 {
        self.jitter_buffer_latency_ms
    }

    pub fn set_max_nack(&mut self, max_nack: u8) {
        self.max_nack = max_nack;
    }

    pub fn max_nack(&self) -> u8 {
        self.max_nack
    }

    pub fn set_rtx_ring_size(&mut self, size: usize) {
        self.rtx_ring_size = size;
    }

    pub fn rtx_ring_size(&self) -> usize {
        self.rtx_ring_size
    }

    pub fn set_bundle_policy(&mut self, policy: BundlePolicy) {
        self.bundle_policy = policy;
    }

    pub fn bundle_policy(&self) -> BundlePolicy {
        self.bundle_policy
    }
}
