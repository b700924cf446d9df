//! Per-viewer player list bookkeeping and the packets it emits

mod info;
mod manager;
pub mod packet;

pub use info::PlayerListInfo;
pub use manager::PlayerListManager;
pub use packet::{OutboundPacket, PlayerListEntry, PlayerListPacket, SerializedSkin, SettingsPacket};

use crate::player::PlayerEntity;
use crate::resource::PlayerSkinProfile;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Player list managers of every connected viewer, keyed by the viewer's player id
#[derive(Default)]
pub struct ViewerRegistry {
    viewers: DashMap<Uuid, Arc<PlayerListManager>>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, viewer_id: Uuid, list: Arc<PlayerListManager>) -> Option<Arc<PlayerListManager>> {
        self.viewers.insert(viewer_id, list)
    }

    pub fn remove(&self, viewer_id: &Uuid) -> Option<Arc<PlayerListManager>> {
        self.viewers.remove(viewer_id).map(|(_, list)| list)
    }

    pub fn get(&self, viewer_id: &Uuid) -> Option<Arc<PlayerListManager>> {
        self.viewers.get(viewer_id).map(|list| list.clone())
    }

    /// Snapshot of all viewers, so no map guard is held while packets go out
    pub fn all(&self) -> Vec<Arc<PlayerListManager>> {
        self.viewers.iter().map(|list| list.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    pub fn notify_player_profile_update(&self, player: &PlayerEntity, profile: &PlayerSkinProfile) {
        for list in self.all() {
            list.notify_player_profile_update(player, profile);
        }
    }
}
