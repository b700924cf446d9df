//! Seams to the surrounding connector: live Bedrock sessions and the client data they carry.

use crate::player_list::packet::{OutboundPacket, SerializedSkin, SettingsPacket};
use crate::texture::TextureData;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AnimatedTextureType {
    #[default]
    None,
    Face,
    Body32x32,
    Body128x128,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ExpressionType {
    #[default]
    Linear,
    Blinking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinAnimation {
    pub image: TextureData,
    pub texture_type: AnimatedTextureType,
    pub frames: f32,
    pub expression: ExpressionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaPiece {
    pub id: String,
    pub piece_type: String,
    pub pack_id: String,
    pub is_default: bool,
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaTint {
    pub piece_type: String,
    pub colors: Vec<String>,
}

/// Appearance section of a Bedrock client's login data
///
/// `resource_patch` and `geometry_data` are kept base64 encoded, as the client sends them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientAppearance {
    pub skin_id: String,
    pub skin: TextureData,
    pub animations: Vec<SkinAnimation>,
    pub animation_data: String,
    pub cape_id: String,
    pub cape: TextureData,
    pub cape_on_classic: bool,
    pub resource_patch: String,
    pub geometry_data: String,
    pub persona: bool,
    pub premium: bool,
    pub arm_size: String,
    pub skin_color: String,
    pub persona_pieces: Vec<PersonaPiece>,
    pub persona_tint_colors: Vec<PersonaTint>,
}

impl ClientAppearance {
    /// Client data reflecting a skin change sent in-game
    pub fn from_serialized(skin: &SerializedSkin) -> Self {
        Self {
            skin_id: skin.skin_id.clone(),
            skin: skin.skin.clone(),
            animations: skin.animations.clone(),
            animation_data: skin.animation_data.clone(),
            cape_id: skin.cape_id.clone(),
            cape: skin.cape.clone(),
            cape_on_classic: skin.cape_on_classic,
            resource_patch: STANDARD.encode(skin.resource_patch.as_bytes()),
            geometry_data: STANDARD.encode(skin.geometry_data.as_bytes()),
            persona: skin.persona,
            premium: skin.premium,
            arm_size: skin.arm_size.clone(),
            skin_color: skin.skin_color.clone(),
            persona_pieces: skin.persona_pieces.clone(),
            persona_tint_colors: skin.persona_tint_colors.clone(),
        }
    }

    pub fn decoded_resource_patch(&self) -> anyhow::Result<String> {
        Ok(String::from_utf8(STANDARD.decode(self.resource_patch.trim())?)?)
    }

    pub fn decoded_geometry_data(&self) -> anyhow::Result<String> {
        Ok(String::from_utf8(STANDARD.decode(self.geometry_data.trim())?)?)
    }
}

/// A connected Bedrock client
pub trait Session: Send + Sync + 'static {
    /// Java uuid of the player this session controls
    fn player_id(&self) -> Uuid;

    /// Uuid the Bedrock client authenticated with
    fn auth_uuid(&self) -> Uuid;

    fn xuid(&self) -> String;

    /// Runtime entity id of the session's own player
    fn entity_id(&self) -> i64;

    fn client_data(&self) -> Option<Arc<ClientAppearance>>;

    fn update_client_data(&self, client_data: ClientAppearance);

    /// Whether the upstream transport accepts game packets yet
    fn is_initialized(&self) -> bool;

    fn send_packet(&self, packet: OutboundPacket);

    /// Permission settings of this session's player as seen under `entity_id`
    fn adventure_settings(&self, entity_id: i64) -> Option<SettingsPacket>;
}

pub trait SessionDirectory: Send + Sync + 'static {
    fn find_by_player_id(&self, player_id: &Uuid) -> Option<Arc<dyn Session>>;
}
