use crate::session::{PersonaPiece, PersonaTint, SkinAnimation};
use crate::texture::TextureData;
use uuid::Uuid;

/// Everything a Bedrock client needs to render a player's appearance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SerializedSkin {
    pub skin_id: String,
    pub play_fab_id: String,
    /// Plain JSON, `{"geometry":{"default":<name>}}`
    pub resource_patch: String,
    pub skin: TextureData,
    pub animations: Vec<SkinAnimation>,
    pub cape: TextureData,
    /// Plain geometry JSON
    pub geometry_data: String,
    pub animation_data: String,
    pub premium: bool,
    pub persona: bool,
    pub cape_on_classic: bool,
    pub cape_id: String,
    pub full_skin_id: String,
    pub arm_size: String,
    pub skin_color: String,
    pub persona_pieces: Vec<PersonaPiece>,
    pub persona_tint_colors: Vec<PersonaTint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerListEntry {
    pub uuid: Uuid,
    pub entity_id: i64,
    pub name: String,
    pub xuid: String,
    pub platform_chat_id: String,
    pub skin: SerializedSkin,
    pub trusted_skin: bool,
}

/// Removals only ever carry the uuid
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerListPacket {
    Add(Vec<PlayerListEntry>),
    Remove(Vec<Uuid>),
}

impl PlayerListPacket {
    pub fn is_remove(&self) -> bool {
        matches!(self, PlayerListPacket::Remove(_))
    }
}

/// Permission flags of a player, addressed by its runtime entity id on the viewer's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsPacket {
    pub unique_entity_id: i64,
    pub command_permission: u32,
    pub player_permission: u32,
    pub flags: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPacket {
    PlayerList(PlayerListPacket),
    Settings(SettingsPacket),
}
