use super::info::PlayerListInfo;
use super::packet::{OutboundPacket, PlayerListEntry, PlayerListPacket, SerializedSkin, SettingsPacket};
use crate::player::PlayerEntity;
use crate::resource::{PlayerSkinProfile, PlayerSkullProfile, ResourceManager};
use crate::session::{Session, SessionDirectory};
use crate::texture::TextureData;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Player list state of a single viewer
///
/// Keeps one [`PlayerListInfo`] per observed player. All changes to a record happen under the
/// map's entry guard, so updates for the same player are applied one at a time. Packets are only
/// sent once the viewer's transport is initialized, otherwise they stay pending until
/// [`PlayerListManager::login`].
pub struct PlayerListManager {
    viewer: Arc<dyn Session>,
    manager: ResourceManager,
    directory: Arc<dyn SessionDirectory>,
    refresh_requests: UnboundedSender<PlayerEntity>,
    records: DashMap<Uuid, PlayerListInfo>,
}

impl PlayerListManager {
    pub fn new(
        viewer: Arc<dyn Session>,
        manager: ResourceManager,
        directory: Arc<dyn SessionDirectory>,
        refresh_requests: UnboundedSender<PlayerEntity>,
    ) -> Self {
        Self {
            viewer,
            manager,
            directory,
            refresh_requests,
            records: DashMap::new(),
        }
    }

    pub fn viewer(&self) -> &Arc<dyn Session> {
        &self.viewer
    }

    pub fn is_registered(&self, player_id: &Uuid) -> bool {
        self.records.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flushes packets left pending while the viewer was not initialized
    pub fn login(&self) {
        self.records.retain(|_, info| {
            let removal = info.has_pending_removal();
            let sent = self.send_packets(info);
            !(removal && sent)
        });
    }

    pub fn register_player(&self, player: &PlayerEntity) {
        let used_dummy = {
            let mut info = self
                .records
                .entry(player.uuid)
                .or_insert_with(|| PlayerListInfo::new(self.owning_session(player), player.clone()));
            if !info.has_sent_update() {
                info.player = player.clone();
                let profile = self
                    .manager
                    .get(&PlayerSkinProfile::descriptor_for(&player.uuid))
                    .ok()
                    .map(|profile| (*profile).clone());
                self.generate_packets(&mut info, profile);
                self.send_packets(&mut info);
            }
            info.used_dummy_profile
        };
        if used_dummy {
            tracing::debug!("Requesting skin refresh of {} for {}", player.username, self.viewer.player_id());
            if self.refresh_requests.send(player.clone()).is_err() {
                tracing::warn!("Skin refresh loop is gone, {} keeps the default skin", player.username);
            }
        }
    }

    pub fn notify_player_spawn_update(&self, player: &PlayerEntity) {
        if let Some(mut info) = self.records.get_mut(&player.uuid) {
            info.player = player.clone();
            info.pending_settings_packet = self.settings_packet(&info);
            self.send_packets(&mut info);
        }
    }

    /// Removes the player from the viewer's list, forgetting it once the removal is sent
    pub fn unregister_player(&self, player: &PlayerEntity) {
        if let Entry::Occupied(mut entry) = self.records.entry(player.uuid) {
            let info = entry.get_mut();
            info.player = player.clone().with_player_list(false);
            let profile = info.last_profile.clone();
            self.generate_packets(info, profile);
            if self.send_packets(info) {
                entry.remove();
            }
        }
    }

    /// Resends the last known profile regardless of what the viewer already has
    pub fn force_player_profile_update(&self, player: &PlayerEntity) {
        if let Some(mut info) = self.records.get_mut(&player.uuid) {
            info.player = player.clone();
            let profile = info.last_profile.clone();
            self.generate_packets(&mut info, profile);
            self.send_packets(&mut info);
        }
    }

    pub fn notify_player_profile_update(&self, player: &PlayerEntity, profile: &PlayerSkinProfile) {
        if let Some(mut info) = self.records.get_mut(&player.uuid) {
            if !info.should_update(player, profile) {
                tracing::trace!("{} already shows the current profile of {}", self.viewer.player_id(), player.username);
                return;
            }
            info.player = player.clone();
            self.generate_packets(&mut info, Some(profile.clone()));
            self.send_packets(&mut info);
        }
    }

    /// Makes the viewer cache a skull texture by briefly adding a fake list entry for it
    pub fn notify_skull_profile_update(&self, skull_player: &PlayerEntity, skull_profile: &PlayerSkullProfile) {
        if !self.viewer.is_initialized() {
            return;
        }
        let (skull, geometry) = match (
            self.manager.get(&skull_profile.skull),
            self.manager.get(&skull_profile.geometry),
        ) {
            (Ok(skull), Ok(geometry)) => (skull, geometry),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Skull of {} is not loaded: {e}", skull_player.uuid);
                return;
            }
        };
        let skin_id = format!("persona.skull.{}", skull_player.uuid);
        let entry = PlayerListEntry {
            uuid: skull_player.uuid,
            entity_id: skull_player.entity_id,
            name: skull_player.username.clone(),
            xuid: String::new(),
            platform_chat_id: String::new(),
            skin: SerializedSkin {
                skin_id: skin_id.clone(),
                resource_patch: geometry.resource_patch.clone(),
                skin: skull.skull_data.clone(),
                geometry_data: geometry.data.clone(),
                cape_id: "no-cape".to_string(),
                full_skin_id: skin_id,
                arm_size: "wide".to_string(),
                skin_color: "#0".to_string(),
                ..SerializedSkin::default()
            },
            trusted_skin: true,
        };
        self.viewer
            .send_packet(OutboundPacket::PlayerList(PlayerListPacket::Add(vec![entry])));
        self.viewer
            .send_packet(OutboundPacket::PlayerList(PlayerListPacket::Remove(vec![skull_player.uuid])));
    }

    fn owning_session(&self, player: &PlayerEntity) -> Option<Arc<dyn Session>> {
        if player.uuid == self.viewer.player_id() {
            Some(self.viewer.clone())
        } else {
            self.directory.find_by_player_id(&player.uuid)
        }
    }

    fn is_own_player(&self, info: &PlayerListInfo) -> bool {
        info.player.uuid == self.viewer.player_id()
    }

    fn generate_packets(&self, info: &mut PlayerListInfo, profile: Option<PlayerSkinProfile>) {
        info.pending_list_packet = Some(self.list_packet(info, profile));
        info.pending_settings_packet = self.settings_packet(info);
        info.last_list_state = Some(info.player.in_player_list);
    }

    fn list_packet(&self, info: &mut PlayerListInfo, profile: Option<PlayerSkinProfile>) -> PlayerListPacket {
        let uuid = match self.is_own_player(info) {
            true => self.viewer.auth_uuid(),
            false => info.player.uuid,
        };
        if !info.player.in_player_list {
            return PlayerListPacket::Remove(vec![uuid]);
        }

        let profile = match profile.filter(|profile| self.is_loaded(profile)) {
            Some(profile) => {
                info.used_dummy_profile = false;
                profile
            }
            None => {
                info.used_dummy_profile = true;
                PlayerSkinProfile::default_for(&info.player)
            }
        };
        let entry = PlayerListEntry {
            uuid,
            entity_id: info.player.entity_id,
            name: info.player.username.clone(),
            xuid: info
                .owning_session
                .as_ref()
                .map(|session| session.xuid())
                .unwrap_or_default(),
            platform_chat_id: String::new(),
            skin: self.serialized_skin(&profile),
            trusted_skin: true,
        };
        info.last_profile = Some(profile);
        PlayerListPacket::Add(vec![entry])
    }

    fn is_loaded(&self, profile: &PlayerSkinProfile) -> bool {
        self.manager.is_available(&profile.skin)
            && self.manager.is_available(&profile.cape)
            && self.manager.is_available(&profile.geometry)
    }

    fn serialized_skin(&self, profile: &PlayerSkinProfile) -> SerializedSkin {
        let mut serialized = SerializedSkin::default();
        match self.manager.get(&profile.skin) {
            Ok(skin) => {
                serialized.skin_id = skin.skin_id.clone();
                serialized.skin = skin.skin_data.clone();
                serialized.animations = skin.animations.clone();
                serialized.animation_data = skin.animation_data.clone();
                serialized.premium = skin.premium;
                serialized.persona = skin.persona;
                serialized.cape_on_classic = skin.cape_on_classic;
                serialized.arm_size = skin.arm_size.clone();
                serialized.skin_color = skin.skin_color.clone();
                serialized.persona_pieces = skin.persona_pieces.clone();
                serialized.persona_tint_colors = skin.persona_tint_colors.clone();
            }
            Err(e) => tracing::warn!("Sending {} without skin: {e}", profile.player_id),
        }
        match self.manager.get(&profile.cape) {
            Ok(cape) => {
                serialized.cape_id = cape.cape_id.clone();
                serialized.cape = cape.cape_data.clone();
            }
            Err(_) => serialized.cape = TextureData::empty(),
        }
        match self.manager.get(&profile.geometry) {
            Ok(geometry) => {
                serialized.resource_patch = geometry.resource_patch.clone();
                serialized.geometry_data = geometry.data.clone();
            }
            Err(e) => tracing::warn!("Sending {} without geometry: {e}", profile.player_id),
        }
        serialized.full_skin_id = format!("{}{}", serialized.skin_id, serialized.cape_id);
        serialized
    }

    /// Only Bedrock players in the list carry permission settings
    fn settings_packet(&self, info: &PlayerListInfo) -> Option<SettingsPacket> {
        if !info.player.in_player_list {
            return None;
        }
        let owning = info.owning_session.as_ref()?;
        let local_id = match self.is_own_player(info) {
            true => self.viewer.entity_id(),
            false => info.player.entity_id,
        };
        owning.adventure_settings(local_id)
    }

    /// Sends pending packets, list first. Returns whether anything went out.
    fn send_packets(&self, info: &mut PlayerListInfo) -> bool {
        if !self.viewer.is_initialized() {
            tracing::debug!(
                "Deferring player list update of {} until {} is initialized",
                info.player.username,
                self.viewer.player_id()
            );
            return false;
        }
        let mut sent = false;
        if let Some(packet) = info.pending_list_packet.take() {
            self.viewer.send_packet(OutboundPacket::PlayerList(packet));
            sent = true;
        }
        if let Some(packet) = info.pending_settings_packet.take() {
            self.viewer.send_packet(OutboundPacket::Settings(packet));
            sent = true;
        }
        sent
    }
}
