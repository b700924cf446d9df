use super::{IdentityRule, Provider, ProviderType};
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::resource::{PlayerSkin, ResourceDescriptor, ResourceLoader, UriPattern};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PlayerSkinType {
    DefaultSteve,
    DefaultAlex,
    BedrockClientData,
    JavaGameProfile,
    JavaMergedEars,
    JavaServerGameProfile,
}

impl ProviderType for PlayerSkinType {
    type Resource = PlayerSkin;

    const PROVIDERS: &'static [Provider<Self>] = &[
        Provider {
            kind: PlayerSkinType::DefaultSteve,
            template: "skin:bedrock/skin/skin_steve.png",
            pattern: UriPattern::Exact("skin:bedrock/skin/skin_steve.png"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: PlayerSkinType::DefaultAlex,
            template: "skin:bedrock/skin/skin_alex.png",
            pattern: UriPattern::Exact("skin:bedrock/skin/skin_alex.png"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: PlayerSkinType::BedrockClientData,
            template: "bedrockClientSkin:{id}",
            pattern: UriPattern::Prefix("bedrockClientSkin:"),
            identity: IdentityRule::UuidAndSkinId,
        },
        Provider {
            kind: PlayerSkinType::JavaGameProfile,
            template: "javaClientSkin:{id}",
            pattern: UriPattern::Prefix("javaClientSkin:"),
            identity: IdentityRule::Uuid,
        },
        Provider {
            kind: PlayerSkinType::JavaMergedEars,
            template: "javaClientSkinEars:{id}",
            pattern: UriPattern::Prefix("javaClientSkinEars:"),
            identity: IdentityRule::Uuid,
        },
        Provider {
            kind: PlayerSkinType::JavaServerGameProfile,
            template: "https://textures.minecraft.net/texture/{id}",
            pattern: UriPattern::Prefix("https://textures.minecraft.net/texture/"),
            identity: IdentityRule::SkinTextureId,
        },
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<PlayerSkin>> {
        match self {
            PlayerSkinType::DefaultSteve | PlayerSkinType::DefaultAlex => loaders.internal.clone(),
            PlayerSkinType::BedrockClientData => loaders.bedrock.clone(),
            PlayerSkinType::JavaGameProfile => loaders.java_profile.clone(),
            PlayerSkinType::JavaMergedEars => loaders.ears_combine.clone(),
            PlayerSkinType::JavaServerGameProfile => loaders.url.clone(),
        }
    }
}

impl PlayerSkinType {
    /// Bundled skin matching the player's model
    pub fn default_for(player: &PlayerEntity) -> ResourceDescriptor<PlayerSkin> {
        match player.slim {
            true => PlayerSkinType::DefaultAlex.descriptor_for(player),
            false => PlayerSkinType::DefaultSteve.descriptor_for(player),
        }
    }
}
