pub use crate::config::SkinConfig;
pub use crate::error::{ConfigError, ResourceError};
pub use crate::fetch::{Fetcher, HttpFetcher};
pub use crate::game_profile::{GameProfile, TextureModel, TextureType};
pub use crate::player::PlayerEntity;
pub use crate::player_list::{OutboundPacket, PlayerListManager, PlayerListPacket, SerializedSkin, SettingsPacket};
pub use crate::provider::{
    CapeType, EarsType, GameProfileDataType, PlayerSkinType, ProviderType, SkinGeometryType, SkullType,
};
pub use crate::resolver::{SkinResolver, SkullOwner};
pub use crate::resource::{
    Cape, Ears, GameProfileData, LoadParams, LoadResult, PlayerSkin, PlayerSkinProfile, PlayerSkullProfile,
    Resource, ResourceDescriptor, ResourceLoader, ResourceManager, SkinGeometry, Skull,
};
pub use crate::service::AppearanceService;
pub use crate::session::{ClientAppearance, Session, SessionDirectory};
pub use crate::texture::TextureData;
