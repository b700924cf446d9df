//! Fallback pipelines settling which skin, cape and geometry a player ends up with

use crate::config::SkinConfig;
use crate::fetch::Fetcher;
use crate::game_profile::GameProfile;
use crate::player::PlayerEntity;
use crate::player_list::ViewerRegistry;
use crate::provider::{
    CapeType, EarsType, GameProfileDataType, PlayerSkinType, ProviderType, SkinGeometryType, SkullType,
    THIRD_PARTY_IDENTITIES,
};
use crate::resource::{
    Ears, EarsSkinParams, LoadParams, PlayerSkin, PlayerSkinProfile, PlayerSkullProfile, Resource,
    ResourceDescriptor, ResourceManager,
};
use crate::session::SessionDirectory;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// The one player whose skin already has ears drawn on
pub const DEADMAU5_UUID: Uuid = Uuid::from_u128(0x1e18d5ff_643d_45c8_b509_43b8461d8614);

/// Owner of a skull block, as stored in its NBT
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkullOwner {
    /// Uuid as four big-endian ints
    pub id: Option<[i32; 4]>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileLookup {
    id: Uuid,
}

/// Runs the Bedrock and Java appearance pipelines and tells viewers about the outcome
#[derive(Clone)]
pub struct SkinResolver {
    manager: ResourceManager,
    config: Arc<SkinConfig>,
    directory: Arc<dyn SessionDirectory>,
    fetcher: Arc<dyn Fetcher>,
    viewers: Arc<ViewerRegistry>,
}

impl SkinResolver {
    pub fn new(
        manager: ResourceManager,
        config: Arc<SkinConfig>,
        directory: Arc<dyn SessionDirectory>,
        fetcher: Arc<dyn Fetcher>,
        viewers: Arc<ViewerRegistry>,
    ) -> Self {
        Self {
            manager,
            config,
            directory,
            fetcher,
            viewers,
        }
    }

    pub fn manager(&self) -> &ResourceManager {
        &self.manager
    }

    /// Loads every bundled resource and pins it, so fallbacks are always at hand
    pub async fn preload_defaults(&self) -> Result<()> {
        for kind in [PlayerSkinType::DefaultSteve, PlayerSkinType::DefaultAlex] {
            self.pin(kind).await?;
        }
        for kind in [SkullType::DefaultSteve, SkullType::DefaultAlex] {
            self.pin(kind).await?;
        }
        for kind in [
            SkinGeometryType::Legacy,
            SkinGeometryType::LegacySlim,
            SkinGeometryType::Ears,
            SkinGeometryType::EarsSlim,
            SkinGeometryType::CustomSkull,
        ] {
            self.pin(kind).await?;
        }
        self.pin(CapeType::None).await?;
        self.pin(EarsType::None).await?;
        self.pin(EarsType::Deadmau5).await?;
        self.pin(GameProfileDataType::None).await?;
        Ok(())
    }

    async fn pin<K: ProviderType>(&self, kind: K) -> Result<()>
    where
        K::Resource: Clone,
    {
        let descriptor = ResourceDescriptor::<K::Resource>::new(kind.template());
        let resource = self.manager.load_async(&descriptor, false).await.into_result()?;
        self.manager.add_pinned(&descriptor, (*resource).clone());
        Ok(())
    }

    /// Bedrock ids of the player's live session, if it has one
    fn with_current_client_data(&self, player: &PlayerEntity) -> PlayerEntity {
        match self
            .directory
            .find_by_player_id(&player.uuid)
            .and_then(|session| session.client_data())
        {
            Some(client_data) => player.clone().with_client_data(&client_data),
            None => player.clone(),
        }
    }

    async fn loads<T: Resource>(&self, descriptor: &ResourceDescriptor<T>) -> bool {
        !self.manager.load_async(descriptor, false).await.is_failed()
    }

    /// Loads `preferred`, falling back to `fallback` when it fails
    async fn first_loading<T: Resource>(
        &self,
        preferred: ResourceDescriptor<T>,
        fallback: ResourceDescriptor<T>,
    ) -> (ResourceDescriptor<T>, bool) {
        if self.loads(&preferred).await {
            (preferred, true)
        } else {
            self.loads(&fallback).await;
            (fallback, false)
        }
    }

    fn store(&self, player: &PlayerEntity, profile: PlayerSkinProfile) -> PlayerSkinProfile {
        self.manager.add(&profile.descriptor(), Ok(profile.clone()));
        self.viewers.notify_player_profile_update(player, &profile);
        profile
    }

    pub async fn register_bedrock_skin(&self, player: &PlayerEntity) -> PlayerSkinProfile {
        let player = self.with_current_client_data(player);
        let skin = PlayerSkinType::BedrockClientData.descriptor_for(&player);
        let geometry = SkinGeometryType::BedrockClientData.descriptor_for(&player);
        let cape = CapeType::BedrockClientData.descriptor_for(&player);
        let results = self
            .manager
            .batch(false)
            .with(&skin)
            .with(&geometry)
            .with(&cape)
            .join()
            .await;

        let mut loaded = false;
        let mut pick = |failed: bool| {
            loaded |= !failed;
            !failed
        };
        let skin = match pick(results.failed(&skin)) {
            true => skin,
            false => PlayerSkinType::default_for(&player),
        };
        let geometry = match pick(results.failed(&geometry)) {
            true => geometry,
            false => SkinGeometryType::default_for(&player),
        };
        let cape = match pick(results.failed(&cape)) {
            true => cape,
            false => CapeType::default_for(&player),
        };
        if !loaded {
            tracing::warn!("No part of the Bedrock skin of {} loaded", player.username);
        }
        tracing::debug!("Bedrock skin of {}: {} {} {}", player.username, skin.uri(), geometry.uri(), cape.uri());

        let profile = PlayerSkinProfile {
            bedrock_skin_loaded: loaded,
            skin,
            cape,
            geometry,
            ..PlayerSkinProfile::default_for(&player)
        };
        self.store(&player, profile)
    }

    pub async fn register_java_skin(&self, player: &PlayerEntity) -> PlayerSkinProfile {
        if let Ok(cached) = self.manager.get(&PlayerSkinProfile::descriptor_for(&player.uuid)) {
            if cached.bedrock_skin_loaded {
                tracing::trace!("Keeping the Bedrock skin of {}", player.username);
                return (*cached).clone();
            }
        }
        let is_bedrock = self.directory.find_by_player_id(&player.uuid).is_some();
        let player = self.with_current_client_data(player);
        // the uri stays the same across profile changes, so the loads are forced
        let params = LoadParams::GameProfile(player.profile.clone());

        let mut skin = PlayerSkinType::JavaGameProfile.descriptor_with(&player, params.clone());
        let mut geometry = SkinGeometryType::JavaGameProfile.descriptor_with(&player, params.clone());
        let mut cape = CapeType::JavaGameProfile.descriptor_with(&player, params);
        let results = self
            .manager
            .batch(true)
            .with(&skin)
            .with(&geometry)
            .with(&cape)
            .join()
            .await;

        let mut using_bedrock_skin = false;
        if results.failed(&skin) {
            skin = match is_bedrock {
                true => {
                    let (skin, bedrock) = self
                        .first_loading(
                            PlayerSkinType::BedrockClientData.descriptor_for(&player),
                            PlayerSkinType::default_for(&player),
                        )
                        .await;
                    using_bedrock_skin = bedrock;
                    skin
                }
                false => {
                    let fallback = PlayerSkinType::default_for(&player);
                    self.loads(&fallback).await;
                    fallback
                }
            };
        }

        let ears = match !is_bedrock && self.config.allow_third_party_ears {
            true => self.find_ears(&player).await,
            false => None,
        };

        if results.failed(&geometry) {
            geometry = match is_bedrock && using_bedrock_skin {
                true => {
                    self.first_loading(
                        SkinGeometryType::BedrockClientData.descriptor_for(&player),
                        SkinGeometryType::default_for(&player),
                    )
                    .await
                    .0
                }
                false => {
                    let fallback = SkinGeometryType::default_for(&player);
                    self.loads(&fallback).await;
                    fallback
                }
            };
        }

        if let Some(ears) = ears {
            geometry = match player.slim {
                true => SkinGeometryType::EarsSlim.descriptor_for(&player),
                false => SkinGeometryType::Ears.descriptor_for(&player),
            };
            self.loads(&geometry).await;
            let merged = self.merged_ears_skin(&player, skin.clone(), ears);
            if !self.manager.load_async(&merged, true).await.is_failed() {
                skin = merged;
            }
        }

        if results.failed(&cape) {
            cape = match self.config.allow_third_party_capes {
                true => self.find_third_party_cape(&player, is_bedrock).await,
                false => None,
            }
            .unwrap_or_else(|| CapeType::default_for(&player));
        }

        tracing::debug!("Java skin of {}: {} {} {}", player.username, skin.uri(), geometry.uri(), cape.uri());
        let profile = PlayerSkinProfile {
            bedrock_skin_loaded: false,
            skin,
            cape,
            geometry,
            ..PlayerSkinProfile::default_for(&player)
        };
        self.store(&player, profile)
    }

    async fn find_ears(&self, player: &PlayerEntity) -> Option<ResourceDescriptor<Ears>> {
        if player.uuid == DEADMAU5_UUID {
            return Some(EarsType::Deadmau5.descriptor_for(player));
        }
        for kind in EarsType::values(THIRD_PARTY_IDENTITIES) {
            let descriptor = kind.descriptor_for(player);
            if self.loads(&descriptor).await {
                tracing::debug!("Found {kind:?} ears for {}", player.username);
                return Some(descriptor);
            }
        }
        None
    }

    fn merged_ears_skin(
        &self,
        player: &PlayerEntity,
        skin: ResourceDescriptor<PlayerSkin>,
        ears: ResourceDescriptor<Ears>,
    ) -> ResourceDescriptor<PlayerSkin> {
        PlayerSkinType::JavaMergedEars
            .descriptor_with(player, LoadParams::EarsSkin(Arc::new(EarsSkinParams { skin, ears })))
    }

    async fn find_third_party_cape(
        &self,
        player: &PlayerEntity,
        is_bedrock: bool,
    ) -> Option<ResourceDescriptor<crate::resource::Cape>> {
        for kind in CapeType::values(THIRD_PARTY_IDENTITIES) {
            let skipped = (kind == CapeType::BedrockClientData && !is_bedrock) || kind == CapeType::JavaGameProfile;
            if skipped {
                continue;
            }
            let descriptor = kind.descriptor_for(player);
            if self.loads(&descriptor).await {
                tracing::debug!("Found {kind:?} cape for {}", player.username);
                return Some(descriptor);
            }
        }
        None
    }

    /// Bedrock pipeline while the player's session has client data, Java pipeline otherwise
    pub async fn refresh_player_skins(&self, player: &PlayerEntity) -> PlayerSkinProfile {
        let has_client_data = self
            .directory
            .find_by_player_id(&player.uuid)
            .is_some_and(|session| session.client_data().is_some());
        match has_client_data {
            true => self.register_bedrock_skin(player).await,
            false => self.register_java_skin(player).await,
        }
    }

    /// Fetches the player's profile from the session server again
    pub async fn refresh_game_profile(&self, player_id: &Uuid) -> Result<Arc<GameProfile>> {
        let data = self
            .manager
            .load_async(&GameProfileDataType::minecraft_descriptor(player_id), true)
            .await
            .into_result()?;
        Ok(data.profile.clone())
    }

    pub async fn register_skull(&self, player: &PlayerEntity) -> Result<PlayerSkullProfile> {
        let skull = SkullType::JavaGameProfile
            .descriptor_with(player, LoadParams::GameProfile(player.profile.clone()));
        let geometry = SkinGeometryType::CustomSkull.descriptor_for(player);
        let results = self.manager.batch(false).with(&skull).with(&geometry).join().await;
        if let Some(error) = results.get(&skull).and_then(|result| result.error().cloned()) {
            return Err(error.into());
        }
        if results.failed(&geometry) {
            bail!("Skull geometry of {} failed to load", player.username);
        }
        let profile = PlayerSkullProfile {
            skull,
            geometry,
            ..PlayerSkullProfile::default_for(player)
        };
        self.manager
            .add(&PlayerSkullProfile::descriptor_for(&player.uuid), Ok(profile.clone()));
        Ok(profile)
    }

    /// Resolves a skull owner to a player uuid. Only a version 4 id is trusted, anything else is
    /// looked up by name.
    pub async fn uuid_for_skull_owner(&self, owner: &SkullOwner) -> Result<Uuid> {
        if let Some([a, b, c, d]) = owner.id {
            let most = ((a as u64) << 32) | (b as u64 & 0xffff_ffff);
            let least = ((c as u64) << 32) | (d as u64 & 0xffff_ffff);
            let uuid = Uuid::from_u64_pair(most, least);
            if uuid.get_version_num() == 4 {
                return Ok(uuid);
            }
        }
        let name = owner
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .context("Skull owner has neither a usable id nor a name")?;
        let url = format!(
            "{}/users/profiles/minecraft/{name}",
            self.config.profile_api.trim_end_matches('/')
        );
        let lookup: ProfileLookup = self.fetcher.fetch_json(&url).await?;
        Ok(lookup.id)
    }
}
