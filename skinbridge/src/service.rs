//! Entry point the connector drives: player list events in, player list packets out

use crate::config::SkinConfig;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::janitor::spawn_image_janitor;
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::player_list::{PlayerListManager, SerializedSkin, ViewerRegistry};
use crate::provider::{GameProfileDataType, register_providers};
use crate::resolver::{SkinResolver, SkullOwner};
use crate::resource::{PlayerSkinProfile, PlayerSkullProfile, ResourceManager};
use crate::session::{ClientAppearance, Session, SessionDirectory};
use anyhow::{Context, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Entity id given to the fake list entries used for skulls
const SKULL_ENTITY_ID: i64 = 0;

/// Wires the resource manager, resolver and per-viewer player lists together
pub struct AppearanceService {
    config: Arc<SkinConfig>,
    manager: ResourceManager,
    directory: Arc<dyn SessionDirectory>,
    resolver: SkinResolver,
    viewers: Arc<ViewerRegistry>,
    players: DashMap<Uuid, PlayerEntity>,
    refresh_requests: mpsc::UnboundedSender<PlayerEntity>,
    tasks: Vec<JoinHandle<()>>,
}

impl AppearanceService {
    /// Builds the service with an HTTP fetcher configured from `config`
    pub async fn start(
        config: SkinConfig,
        runtime: tokio::runtime::Handle,
        directory: Arc<dyn SessionDirectory>,
    ) -> Result<Self> {
        let mut fetcher = HttpFetcher::new(config.fetch_timeout())?;
        if config.image_retention().is_some() {
            fetcher = fetcher.with_image_cache(&config.image_cache_folder);
        }
        Self::with_fetcher(config, runtime, directory, Arc::new(fetcher)).await
    }

    pub async fn with_fetcher(
        config: SkinConfig,
        runtime: tokio::runtime::Handle,
        directory: Arc<dyn SessionDirectory>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let manager = ResourceManager::new(runtime.clone(), config.cache_idle_expiry());
        let loaders = LoaderSet::new(&config, fetcher.clone(), directory.clone());
        register_providers(&manager, &loaders);

        let viewers = Arc::new(ViewerRegistry::new());
        let resolver = SkinResolver::new(
            manager.clone(),
            config.clone(),
            directory.clone(),
            fetcher,
            viewers.clone(),
        );
        resolver
            .preload_defaults()
            .await
            .context("Failed to load bundled skins")?;

        let (refresh_requests, receiver) = mpsc::unbounded_channel();
        let mut tasks = vec![
            spawn_refresh_loop(&runtime, resolver.clone(), receiver),
            manager.spawn_expiry_sweeper(config.cache_idle_expiry().max(Duration::from_secs(1))),
        ];
        if let Some(retention) = config.image_retention() {
            tasks.push(spawn_image_janitor(&runtime, config.image_cache_folder.clone(), retention));
        }
        tracing::info!("Appearance service started");

        Ok(Self {
            config,
            manager,
            directory,
            resolver,
            viewers,
            players: DashMap::new(),
            refresh_requests,
            tasks,
        })
    }

    pub fn config(&self) -> &SkinConfig {
        &self.config
    }

    pub fn manager(&self) -> &ResourceManager {
        &self.manager
    }

    pub fn resolver(&self) -> &SkinResolver {
        &self.resolver
    }

    pub fn viewer(&self, viewer_id: &Uuid) -> Option<Arc<PlayerListManager>> {
        self.viewers.get(viewer_id)
    }

    /// Starts tracking the player list of a Bedrock viewer and shows it everyone already known
    pub fn connect_viewer(&self, viewer: Arc<dyn Session>) -> Arc<PlayerListManager> {
        let viewer_id = viewer.player_id();
        let list = Arc::new(PlayerListManager::new(
            viewer,
            self.manager.clone(),
            self.directory.clone(),
            self.refresh_requests.clone(),
        ));
        if self.viewers.insert(viewer_id, list.clone()).is_some() {
            tracing::warn!("Viewer {viewer_id} connected twice, dropping its old player list");
        }
        for player in self.players.iter().filter(|player| player.in_player_list) {
            list.register_player(player.value());
        }
        list
    }

    pub fn disconnect_viewer(&self, viewer_id: &Uuid) {
        if self.viewers.remove(viewer_id).is_none() {
            tracing::debug!("Viewer {viewer_id} was not connected");
        }
    }

    /// Sends everything held back while the viewer was still logging in
    pub fn on_viewer_login(&self, viewer_id: &Uuid) {
        match self.viewers.get(viewer_id) {
            Some(list) => list.login(),
            None => tracing::warn!("Login of unknown viewer {viewer_id}"),
        }
    }

    pub fn on_player_joined_list(&self, player: &PlayerEntity) {
        let player = player.clone().with_player_list(true);
        self.players.insert(player.uuid, player.clone());
        for list in self.viewers.all() {
            list.register_player(&player);
        }
        self.request_refresh(player);
    }

    pub fn on_player_left_list(&self, player: &PlayerEntity) {
        let player = self
            .players
            .remove(&player.uuid)
            .map(|(_, known)| known)
            .unwrap_or_else(|| player.clone())
            .with_player_list(false);
        for list in self.viewers.all() {
            list.unregister_player(&player);
        }
    }

    /// Replaces the session's client data with a skin sent in-game and reruns the Bedrock pipeline
    pub async fn on_client_appearance_data(
        &self,
        player_id: &Uuid,
        skin: &SerializedSkin,
    ) -> Result<PlayerSkinProfile> {
        let session = self
            .directory
            .find_by_player_id(player_id)
            .with_context(|| format!("No Bedrock session for {player_id}"))?;
        let client_data = ClientAppearance::from_serialized(skin);
        let player = self
            .players
            .get(player_id)
            .map(|player| player.clone())
            .with_context(|| format!("{player_id} is not in the player list"))?
            .with_client_data(&client_data);
        session.update_client_data(client_data);
        self.players.insert(player.uuid, player.clone());
        tracing::info!("{} changed skin to {}", player.username, skin.skin_id);
        Ok(self.resolver.register_bedrock_skin(&player).await)
    }

    /// Resolves the skull's owner and sends its texture to the viewer that rendered it
    pub async fn on_skull_block_rendered(&self, viewer_id: &Uuid, owner: &SkullOwner) -> Result<()> {
        let list = self
            .viewers
            .get(viewer_id)
            .with_context(|| format!("Unknown viewer {viewer_id}"))?;
        let owner_id = self.resolver.uuid_for_skull_owner(owner).await?;
        let profile = self
            .manager
            .get_or_load(&GameProfileDataType::minecraft_descriptor(&owner_id))
            .await?;
        let skull_player = PlayerEntity::new((*profile.profile).clone(), SKULL_ENTITY_ID);
        let skull_profile = match self.manager.get(&PlayerSkullProfile::descriptor_for(&owner_id)) {
            Ok(cached) => (*cached).clone(),
            Err(_) => self.resolver.register_skull(&skull_player).await?,
        };
        list.notify_skull_profile_update(&skull_player, &skull_profile);
        Ok(())
    }

    fn request_refresh(&self, player: PlayerEntity) {
        if self.refresh_requests.send(player).is_err() {
            tracing::error!("Skin refresh loop stopped");
        }
    }
}

impl Drop for AppearanceService {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Runs the appearance pipeline for every requested player
///
/// At most one refresh runs per player. A request arriving meanwhile is parked, replacing any
/// older parked one, and runs as soon as the current refresh finishes.
fn spawn_refresh_loop(
    runtime: &tokio::runtime::Handle,
    resolver: SkinResolver,
    mut receiver: mpsc::UnboundedReceiver<PlayerEntity>,
) -> JoinHandle<()> {
    let runtime_handle = runtime.clone();
    runtime.spawn(async move {
        let parked: Arc<DashMap<Uuid, Option<PlayerEntity>>> = Arc::new(DashMap::new());
        while let Some(player) = receiver.recv().await {
            match parked.entry(player.uuid) {
                Entry::Occupied(mut running) => {
                    tracing::trace!("Skin refresh of {} already running, parking request", player.username);
                    running.insert(Some(player));
                    continue;
                }
                Entry::Vacant(idle) => {
                    idle.insert(None);
                }
            }
            let (resolver, parked) = (resolver.clone(), parked.clone());
            runtime_handle.spawn(async move {
                let mut player = player;
                loop {
                    resolver.refresh_player_skins(&player).await;
                    // decided under the entry guard so a request cannot slip in between
                    let next = match parked.entry(player.uuid) {
                        Entry::Occupied(mut running) => {
                            let next = running.get_mut().take();
                            if next.is_none() {
                                running.remove();
                            }
                            next
                        }
                        Entry::Vacant(_) => None,
                    };
                    match next {
                        Some(next) => player = next,
                        None => break,
                    }
                }
            });
        }
    })
}
