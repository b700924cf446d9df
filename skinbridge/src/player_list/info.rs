use super::packet::{PlayerListPacket, SettingsPacket};
use crate::player::PlayerEntity;
use crate::resource::PlayerSkinProfile;
use crate::session::Session;
use std::sync::Arc;

/// What one viewer has been told about one observed player
pub struct PlayerListInfo {
    /// Session controlling the observed player, if it is a Bedrock player
    pub owning_session: Option<Arc<dyn Session>>,
    pub player: PlayerEntity,
    pub last_profile: Option<PlayerSkinProfile>,
    pub used_dummy_profile: bool,
    /// Membership sent last, `None` until anything was generated
    pub last_list_state: Option<bool>,
    pub pending_list_packet: Option<PlayerListPacket>,
    pub pending_settings_packet: Option<SettingsPacket>,
}

impl PlayerListInfo {
    pub fn new(owning_session: Option<Arc<dyn Session>>, player: PlayerEntity) -> Self {
        Self {
            owning_session,
            player,
            last_profile: None,
            used_dummy_profile: false,
            last_list_state: None,
            pending_list_packet: None,
            pending_settings_packet: None,
        }
    }

    pub fn has_sent_update(&self) -> bool {
        self.last_list_state.is_some()
    }

    /// An update is due unless the viewer already holds exactly this state
    pub fn should_update(&self, player: &PlayerEntity, profile: &PlayerSkinProfile) -> bool {
        !self.has_sent_update()
            || self.last_list_state != Some(player.in_player_list)
            || self.last_profile.as_ref() != Some(profile)
    }

    pub fn has_pending_removal(&self) -> bool {
        self.pending_list_packet
            .as_ref()
            .is_some_and(PlayerListPacket::is_remove)
    }
}

impl std::fmt::Debug for PlayerListInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerListInfo")
            .field("player", &self.player.uuid)
            .field("bedrock", &self.owning_session.is_some())
            .field("last_profile", &self.last_profile)
            .field("used_dummy_profile", &self.used_dummy_profile)
            .field("last_list_state", &self.last_list_state)
            .finish()
    }
}
