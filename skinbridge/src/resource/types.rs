use super::{Resource, ResourceDescriptor};
use crate::game_profile::GameProfile;
use crate::player::PlayerEntity;
use crate::provider::{CapeType, PlayerSkinType, ProviderType, SkinGeometryType, SkullType};
use crate::session::{PersonaPiece, PersonaTint, SkinAnimation};
use crate::texture::TextureData;
use anyhow::Context;
use derivative::Derivative;
use std::sync::Arc;
use uuid::Uuid;

macro_rules! impl_resource {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Resource for $ty {
                const KIND: &'static str = $kind;

                fn resource_uri(&self) -> &str {
                    &self.resource_uri
                }
            }
        )*
    };
}

impl_resource!(
    PlayerSkin => "skin",
    Cape => "cape",
    Ears => "ears",
    Skull => "skull",
    SkinGeometry => "geometry",
    GameProfileData => "game profile",
    PlayerSkinProfile => "skin profile",
    PlayerSkullProfile => "skull profile",
);

#[derive(Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
pub struct PlayerSkin {
    pub resource_uri: String,
    pub skin_id: String,
    pub skin_data: TextureData,
    pub animations: Vec<SkinAnimation>,
    pub animation_data: String,
    pub premium: bool,
    pub persona: bool,
    pub cape_on_classic: bool,
    #[derivative(Default(value = "\"wide\".to_string()"))]
    pub arm_size: String,
    #[derivative(Default(value = "\"#0\".to_string()"))]
    pub skin_color: String,
    pub persona_pieces: Vec<PersonaPiece>,
    pub persona_tint_colors: Vec<PersonaTint>,
}

impl PlayerSkin {
    pub fn new(resource_uri: impl Into<String>, skin_id: impl Into<String>, skin_data: TextureData) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            skin_id: skin_id.into(),
            skin_data,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cape {
    pub resource_uri: String,
    pub cape_id: String,
    pub cape_data: TextureData,
}

impl Cape {
    /// Stand-in for "no cape"
    pub fn none(resource_uri: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ears {
    pub resource_uri: String,
    pub ears_data: TextureData,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Skull {
    pub resource_uri: String,
    pub skull_id: String,
    pub skull_data: TextureData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinGeometry {
    pub resource_uri: String,
    /// `{"geometry":{"default":<name>}}`
    pub resource_patch: String,
    pub name: String,
    /// Geometry JSON, empty for geometries built into the client
    pub data: String,
}

impl SkinGeometry {
    pub fn named(resource_uri: impl Into<String>, name: impl Into<String>, data: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            resource_uri: resource_uri.into(),
            resource_patch: resource_patch_for(&name),
            name,
            data: data.into(),
        }
    }

    pub fn from_patch(
        resource_uri: impl Into<String>,
        resource_patch: impl Into<String>,
        data: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let resource_patch = resource_patch.into();
        Ok(Self {
            resource_uri: resource_uri.into(),
            name: geometry_name(&resource_patch)?,
            resource_patch,
            data: data.into(),
        })
    }
}

pub fn resource_patch_for(geometry_name: &str) -> String {
    serde_json::json!({ "geometry": { "default": geometry_name } }).to_string()
}

pub fn geometry_name(resource_patch: &str) -> anyhow::Result<String> {
    let patch: serde_json::Value =
        serde_json::from_str(resource_patch).context("Invalid resource patch")?;
    patch
        .pointer("/geometry/default")
        .and_then(|name| name.as_str())
        .map(str::to_string)
        .with_context(|| format!("Resource patch has no default geometry: {resource_patch}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProfileData {
    pub resource_uri: String,
    pub profile: Arc<GameProfile>,
}

/// Settled appearance of a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSkinProfile {
    pub resource_uri: String,
    pub player_id: Uuid,
    pub bedrock_skin_loaded: bool,
    pub skin: ResourceDescriptor<PlayerSkin>,
    pub cape: ResourceDescriptor<Cape>,
    pub geometry: ResourceDescriptor<SkinGeometry>,
}

impl PlayerSkinProfile {
    pub fn uri_for(player_id: &Uuid) -> String {
        format!("skinProfile:{player_id}")
    }

    pub fn descriptor_for(player_id: &Uuid) -> ResourceDescriptor<PlayerSkinProfile> {
        ResourceDescriptor::new(Self::uri_for(player_id))
    }

    pub fn descriptor(&self) -> ResourceDescriptor<PlayerSkinProfile> {
        ResourceDescriptor::new(self.resource_uri.clone())
    }

    /// Bundled steve/alex appearance, always available
    pub fn default_for(player: &PlayerEntity) -> Self {
        Self {
            resource_uri: Self::uri_for(&player.uuid),
            player_id: player.uuid,
            bedrock_skin_loaded: false,
            skin: PlayerSkinType::default_for(player),
            cape: CapeType::default_for(player),
            geometry: SkinGeometryType::default_for(player),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSkullProfile {
    pub resource_uri: String,
    pub player_id: Uuid,
    pub skull: ResourceDescriptor<Skull>,
    pub geometry: ResourceDescriptor<SkinGeometry>,
}

impl PlayerSkullProfile {
    pub fn uri_for(player_id: &Uuid) -> String {
        format!("skullProfile:{player_id}")
    }

    pub fn descriptor_for(player_id: &Uuid) -> ResourceDescriptor<PlayerSkullProfile> {
        ResourceDescriptor::new(Self::uri_for(player_id))
    }

    pub fn default_for(player: &PlayerEntity) -> Self {
        Self {
            resource_uri: Self::uri_for(&player.uuid),
            player_id: player.uuid,
            skull: SkullType::default_for(player),
            geometry: SkinGeometryType::CustomSkull.descriptor_for(player),
        }
    }
}
