pub mod media_engine;
pub mod setting_engine;

pub use media_engine::MediaEngine;
pub use setting_engine::SettingEngine;

use crate::peer_connection::PeerConnection;

/// API bundles the MediaEngine and SettingEngine used to construct
/// PeerConnections, mirroring the factory pattern used by the pc-per-actor
/// model: construct once per application, then spawn many PeerConnections.
#[derive(Clone, Default)]
pub struct API {
    pub(crate) media_engine: MediaEngine,
    pub(crate) setting_engine: SettingEngine,
}

impl API {
    pub fn new(media_engine: MediaEngine, setting_engine: SettingEngine) -> Self {
        API {
            media_engine,
            setting_engine,
        }
    }

    pub fn new_peer_connection(&self) -> PeerConnection {
        PeerConnection::new(self.media_engine.clone(), self.setting_engine.clone())
    }
}
