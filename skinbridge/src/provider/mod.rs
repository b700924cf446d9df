//! Catalogue of the places each kind of resource can come from
//!
//! Every family is a closed enum backed by a static table of [`Provider`] rows. A row says how the
//! URI is built from a player, which URIs it owns, and [`ProviderType::loader`] binds the loader
//! serving it.

mod cape;
mod ears;
mod game_profile;
mod geometry;
mod skin;
mod skull;

pub use cape::CapeType;
pub use ears::EarsType;
pub use game_profile::GameProfileDataType;
pub use geometry::SkinGeometryType;
pub use skin::PlayerSkinType;
pub use skull::SkullType;

use crate::game_profile::TextureType;
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::resource::{LoadParams, Resource, ResourceDescriptor, ResourceLoader, ResourceManager, UriPattern};
use std::fmt::Debug;
use std::sync::Arc;

/// How the `{id}` placeholder of a provider's URI template is derived from a player
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IdentityRule {
    /// Fixed URI
    None,
    Username,
    /// Undashed uuid
    Uuid,
    UuidDashed,
    /// `<uuid>/<client skin id>`
    UuidAndSkinId,
    /// `<uuid>/<client cape id>`
    UuidAndCapeId,
    /// Last path segment of the profile's skin URL
    SkinTextureId,
    /// Last path segment of the profile's cape URL
    CapeTextureId,
}

/// Identity kinds which third-party services can be queried with
pub const THIRD_PARTY_IDENTITIES: &[IdentityRule] =
    &[IdentityRule::Uuid, IdentityRule::UuidDashed, IdentityRule::Username];

impl IdentityRule {
    pub fn identity_for(self, player: &PlayerEntity) -> String {
        match self {
            IdentityRule::None => String::new(),
            IdentityRule::Username => player.username.clone(),
            IdentityRule::Uuid => player.uuid.simple().to_string(),
            IdentityRule::UuidDashed => player.uuid.hyphenated().to_string(),
            IdentityRule::UuidAndSkinId => {
                format!("{}/{}", player.uuid, player.bedrock_skin_id.as_deref().unwrap_or_default())
            }
            IdentityRule::UuidAndCapeId => {
                format!("{}/{}", player.uuid, player.bedrock_cape_id.as_deref().unwrap_or_default())
            }
            IdentityRule::SkinTextureId => player.profile.texture_id(TextureType::Skin).unwrap_or_default(),
            IdentityRule::CapeTextureId => player.profile.texture_id(TextureType::Cape).unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct Provider<K> {
    pub kind: K,
    pub template: &'static str,
    pub pattern: UriPattern,
    pub identity: IdentityRule,
}

pub trait ProviderType: Copy + Eq + Debug + Send + Sync + 'static {
    type Resource: Resource;

    /// Rows in declaration order, which is also lookup precedence
    const PROVIDERS: &'static [Provider<Self>];

    /// Position of this variant in [`ProviderType::PROVIDERS`]
    fn index(self) -> usize;

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<Self::Resource>>;

    fn provider(self) -> &'static Provider<Self> {
        &Self::PROVIDERS[self.index()]
    }

    fn template(self) -> &'static str {
        self.provider().template
    }

    fn pattern(self) -> UriPattern {
        self.provider().pattern
    }

    fn identity(self) -> IdentityRule {
        self.provider().identity
    }

    fn uri_for(self, player: &PlayerEntity) -> String {
        let provider = self.provider();
        match provider.identity {
            IdentityRule::None => provider.template.to_string(),
            rule => provider.template.replace("{id}", &rule.identity_for(player)),
        }
    }

    fn descriptor_for(self, player: &PlayerEntity) -> ResourceDescriptor<Self::Resource> {
        ResourceDescriptor::new(self.uri_for(player))
    }

    fn descriptor_with(self, player: &PlayerEntity, params: LoadParams) -> ResourceDescriptor<Self::Resource> {
        ResourceDescriptor::with_params(self.uri_for(player), params)
    }

    /// First provider whose pattern owns `uri`
    fn from_uri(uri: &str) -> Option<Self> {
        Self::PROVIDERS
            .iter()
            .find(|provider| provider.pattern.matches(uri))
            .map(|provider| provider.kind)
    }

    /// Providers using one of the `allowed` identity rules, in precedence order
    fn values(allowed: &[IdentityRule]) -> Vec<Self> {
        Self::PROVIDERS
            .iter()
            .filter(|provider| allowed.contains(&provider.identity))
            .map(|provider| provider.kind)
            .collect()
    }

    fn all() -> impl Iterator<Item = Self> {
        Self::PROVIDERS.iter().map(|provider| provider.kind)
    }
}

fn register<K: ProviderType>(manager: &ResourceManager, loaders: &LoaderSet) {
    for provider in K::PROVIDERS {
        manager.register_loader::<K::Resource>(provider.pattern, provider.kind.loader(loaders));
    }
}

/// Binds every provider of every family to its loader
pub fn register_providers(manager: &ResourceManager, loaders: &LoaderSet) {
    register::<PlayerSkinType>(manager, loaders);
    register::<CapeType>(manager, loaders);
    register::<SkinGeometryType>(manager, loaders);
    register::<EarsType>(manager, loaders);
    register::<SkullType>(manager, loaders);
    register::<GameProfileDataType>(manager, loaders);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_profile::{GameProfile, TEXTURES_PROPERTY, TextureModel, encode_textures};
    use rand::Rng;
    use rand::distr::Alphanumeric;
    use uuid::Uuid;

    fn random_player() -> PlayerEntity {
        let mut rng = rand::rng();
        let len = rng.random_range(3..16);
        let name: String = (&mut rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect();
        let skin = format!("http://textures.minecraft.net/texture/{:x}", rng.random::<u64>());
        let cape = format!("http://textures.minecraft.net/texture/{:x}/", rng.random::<u64>());
        let profile = GameProfile::new(Uuid::new_v4(), name).with_property(
            TEXTURES_PROPERTY,
            encode_textures(Some((&skin, TextureModel::Wide)), Some(&cape)),
        );
        PlayerEntity::new(profile, rng.random_range(1..10_000))
            .with_slim(rng.random_bool(0.5))
    }

    fn assert_unique_identities<K: ProviderType>(player: &PlayerEntity) {
        for own in K::all() {
            let uri = own.uri_for(player);
            assert_eq!(K::from_uri(&uri), Some(own), "{own:?} does not own {uri}");
            for other in K::all().filter(|other| *other != own) {
                assert!(
                    !other.pattern().matches(&uri),
                    "{other:?} collides with {own:?} on {uri}"
                );
            }
        }
    }

    #[test]
    fn test_provider_identities_are_unique() {
        for _ in 0..32 {
            let player = random_player();
            assert_unique_identities::<PlayerSkinType>(&player);
            assert_unique_identities::<CapeType>(&player);
            assert_unique_identities::<SkinGeometryType>(&player);
            assert_unique_identities::<EarsType>(&player);
            assert_unique_identities::<SkullType>(&player);
            assert_unique_identities::<GameProfileDataType>(&player);
        }
    }

    fn assert_table_order<K: ProviderType>() {
        for (index, provider) in K::PROVIDERS.iter().enumerate() {
            assert_eq!(provider.kind.index(), index, "{:?} is out of place", provider.kind);
        }
    }

    #[test]
    fn test_tables_are_indexed_by_variant() {
        assert_table_order::<PlayerSkinType>();
        assert_table_order::<CapeType>();
        assert_table_order::<SkinGeometryType>();
        assert_table_order::<EarsType>();
        assert_table_order::<SkullType>();
        assert_table_order::<GameProfileDataType>();
    }

    #[test]
    fn test_identity_rules() {
        let player = PlayerEntity::new(
            GameProfile::new(Uuid::parse_str("1e18d5ff-643d-45c8-b509-43b8461d8614").unwrap(), "deadmau5"),
            7,
        );
        assert_eq!(IdentityRule::Uuid.identity_for(&player), "1e18d5ff643d45c8b50943b8461d8614");
        assert_eq!(IdentityRule::UuidDashed.identity_for(&player), "1e18d5ff-643d-45c8-b509-43b8461d8614");
        assert_eq!(IdentityRule::Username.identity_for(&player), "deadmau5");
        let bedrock = player.clone();
        let bedrock = PlayerEntity {
            bedrock_skin_id: Some("skin-7".to_string()),
            ..bedrock
        };
        assert_eq!(
            IdentityRule::UuidAndSkinId.identity_for(&bedrock),
            "1e18d5ff-643d-45c8-b509-43b8461d8614/skin-7"
        );
        assert_eq!(IdentityRule::SkinTextureId.identity_for(&player), "");
    }
}
