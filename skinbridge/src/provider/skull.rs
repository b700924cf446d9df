use super::{IdentityRule, Provider, ProviderType};
use crate::loaders::LoaderSet;
use crate::player::PlayerEntity;
use crate::resource::{ResourceDescriptor, ResourceLoader, Skull, UriPattern};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SkullType {
    DefaultSteve,
    DefaultAlex,
    JavaGameProfile,
    JavaServerGameProfile,
}

impl ProviderType for SkullType {
    type Resource = Skull;

    const PROVIDERS: &'static [Provider<Self>] = &[
        Provider {
            kind: SkullType::DefaultSteve,
            template: "skin:bedrock/skin/skin_steve.png",
            pattern: UriPattern::Exact("skin:bedrock/skin/skin_steve.png"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: SkullType::DefaultAlex,
            template: "skin:bedrock/skin/skin_alex.png",
            pattern: UriPattern::Exact("skin:bedrock/skin/skin_alex.png"),
            identity: IdentityRule::None,
        },
        Provider {
            kind: SkullType::JavaGameProfile,
            template: "javaClientSkull:{id}",
            pattern: UriPattern::Prefix("javaClientSkull:"),
            identity: IdentityRule::Uuid,
        },
        Provider {
            kind: SkullType::JavaServerGameProfile,
            template: "https://textures.minecraft.net/texture/{id}",
            pattern: UriPattern::Prefix("https://textures.minecraft.net/texture/"),
            identity: IdentityRule::SkinTextureId,
        },
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn loader(self, loaders: &LoaderSet) -> Arc<dyn ResourceLoader<Skull>> {
        match self {
            SkullType::DefaultSteve | SkullType::DefaultAlex => loaders.internal.clone(),
            SkullType::JavaGameProfile => loaders.java_profile.clone(),
            SkullType::JavaServerGameProfile => loaders.url.clone(),
        }
    }
}

impl SkullType {
    pub fn default_for(player: &PlayerEntity) -> ResourceDescriptor<Skull> {
        match player.slim {
            true => SkullType::DefaultAlex.descriptor_for(player),
            false => SkullType::DefaultSteve.descriptor_for(player),
        }
    }
}
