//! In-memory collaborators for tests

use crate::fetch::Fetcher;
use crate::game_profile::GameProfile;
use crate::player::PlayerEntity;
use crate::player_list::{OutboundPacket, SettingsPacket};
use crate::resource::types::resource_patch_for;
use crate::session::{ClientAppearance, Session, SessionDirectory};
use crate::texture::TextureData;
use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// Serves fixed bodies by URL, anything else fails like an unreachable host
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Bytes>,
    delays: HashMap<String, Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    /// Like [`StaticFetcher::with`], but the response only arrives after `delay`
    pub fn with_delay(mut self, url: impl Into<String>, body: impl Into<Bytes>, delay: Duration) -> Self {
        let url = url.into();
        self.delays.insert(url.clone(), delay);
        self.with(url, body)
    }
}

impl Fetcher for StaticFetcher {
    fn fetch_bytes(&self, url: &str) -> BoxFuture<'static, anyhow::Result<Bytes>> {
        let response = self
            .responses
            .get(url)
            .cloned()
            .with_context(|| format!("Connection refused: {url}"));
        match self.delays.get(url).copied() {
            Some(delay) => async move {
                tokio::time::sleep(delay).await;
                response
            }
            .boxed(),
            None => future::ready(response).boxed(),
        }
    }
}

/// Opaque white PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
    let mut encoded = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, image::ImageFormat::Png)
        .unwrap();
    encoded.into_inner()
}

/// Classic skin with a client side geometry, as a Bedrock client would send it
pub fn client_appearance(skin_id: &str, size: u32) -> ClientAppearance {
    ClientAppearance {
        skin_id: skin_id.to_string(),
        skin: TextureData::new(vec![255u8; (size * size * 4) as usize], size, size),
        cape_id: format!("{skin_id}-cape"),
        cape: TextureData::new(vec![255u8; 64 * 32 * 4], 64, 32),
        resource_patch: STANDARD.encode(resource_patch_for("geometry.humanoid.custom")),
        geometry_data: STANDARD.encode("{}"),
        arm_size: "wide".to_string(),
        skin_color: "#0".to_string(),
        ..ClientAppearance::default()
    }
}

/// Session capturing every packet sent to it
pub struct RecordingSession {
    player_id: Uuid,
    auth_uuid: Uuid,
    entity_id: AtomicI64,
    initialized: AtomicBool,
    client_data: RwLock<Option<Arc<ClientAppearance>>>,
    sender: Sender<OutboundPacket>,
    receiver: Receiver<OutboundPacket>,
}

impl RecordingSession {
    pub fn new(player_id: Uuid, entity_id: i64, initialized: bool) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            player_id,
            auth_uuid: Uuid::new_v4(),
            entity_id: AtomicI64::new(entity_id),
            initialized: AtomicBool::new(initialized),
            client_data: RwLock::new(None),
            sender,
            receiver,
        }
    }

    pub fn with_client_data(self, client_data: ClientAppearance) -> Self {
        *self.client_data.write().unwrap() = Some(Arc::new(client_data));
        self
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::SeqCst);
    }

    /// Packets sent since the last drain, in order
    pub fn drain(&self) -> Vec<OutboundPacket> {
        self.receiver.try_iter().collect()
    }
}

impl Session for RecordingSession {
    fn player_id(&self) -> Uuid {
        self.player_id
    }

    fn auth_uuid(&self) -> Uuid {
        self.auth_uuid
    }

    fn xuid(&self) -> String {
        format!("xuid-{}", self.player_id.simple())
    }

    fn entity_id(&self) -> i64 {
        self.entity_id.load(Ordering::SeqCst)
    }

    fn client_data(&self) -> Option<Arc<ClientAppearance>> {
        self.client_data.read().unwrap().clone()
    }

    fn update_client_data(&self, client_data: ClientAppearance) {
        *self.client_data.write().unwrap() = Some(Arc::new(client_data));
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn send_packet(&self, packet: OutboundPacket) {
        self.sender.send(packet).unwrap();
    }

    fn adventure_settings(&self, entity_id: i64) -> Option<SettingsPacket> {
        Some(SettingsPacket {
            unique_entity_id: entity_id,
            ..SettingsPacket::default()
        })
    }
}

#[derive(Default)]
pub struct StaticDirectory {
    sessions: DashMap<Uuid, Arc<dyn Session>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<dyn Session>) {
        self.sessions.insert(session.player_id(), session);
    }
}

impl SessionDirectory for StaticDirectory {
    fn find_by_player_id(&self, player_id: &Uuid) -> Option<Arc<dyn Session>> {
        self.sessions.get(player_id).map(|session| session.clone())
    }
}

/// Registers a Bedrock session carrying `client_data` and returns its player
pub fn bedrock_player(
    directory: &StaticDirectory,
    name: &str,
    client_data: ClientAppearance,
) -> (PlayerEntity, Arc<RecordingSession>) {
    let player = PlayerEntity::new(GameProfile::new(Uuid::new_v4(), name), 100)
        .with_slim(false)
        .with_client_data(&client_data);
    let session = Arc::new(RecordingSession::new(player.uuid, 100, true).with_client_data(client_data));
    directory.insert(session.clone());
    (player, session)
}
